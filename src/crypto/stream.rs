//! # Symmetric Stream Cipher
//!
//! Encrypts and decrypts file bodies of arbitrary length under a per-file
//! key, with forward-only and seekable random-access decryption modes.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ENCRYPTED FILE BODY                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────┬──────────────────────────────────────────────┐        │
//! │  │  IV          │  AES-256-CTR keystream ⊕ plaintext           │        │
//! │  │  (16 bytes,  │  (same length as the plaintext,              │        │
//! │  │   clear)     │   no padding, no length prefix, no tag)      │        │
//! │  └──────────────┴──────────────────────────────────────────────┘        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Seekable Decryption
//!
//! Large files are fetched and played back in ranges, so decryption must
//! resume at an arbitrary plaintext offset without touching the skipped
//! regions:
//!
//! ```text
//! logical offset k
//!       │
//!       ├── reposition source to k + 16         (skip the IV header)
//!       ├── block = k / 16, off = k % 16
//!       ├── keystream ← CTR(key, IV + block)    (128-bit big-endian add)
//!       └── discard off keystream bytes         (align to the exact byte)
//! ```
//!
//! Reads after a seek are byte-for-byte identical to a full forward
//! decrypt truncated to the same range.
//!
//! ## Integrity
//!
//! This cipher provides confidentiality only: there is no per-chunk
//! authentication tag. Integrity is assumed to be covered by the
//! content-addressing layer's hash verification of the stored blob. A
//! deployment where ciphertext can be tampered with undetected must wrap
//! this stream in authenticated encryption instead.

use std::io::{Read, Seek, SeekFrom, Write};

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Size of the IV header carried in the clear at the start of every
/// encrypted file body
pub const IV_SIZE: usize = 16;

/// AES block size; the keystream advances in counter blocks of this width
pub const BLOCK_SIZE: usize = 16;

/// Size of a per-file stream key (256 bits)
pub const STREAM_KEY_SIZE: usize = 32;

/// I/O chunk size for the forward modes
const IO_BUF_SIZE: usize = 64 * 1024;

/// AES-256 in CTR mode with a full 128-bit big-endian counter
type Aes256Ctr = Ctr128BE<Aes256>;

/// Generate a fresh random stream key.
///
/// One key encrypts exactly one file; keys reach recipients only inside a
/// sealed box (private mode) or are re-derived from a shared passphrase
/// (password mode, see [`derive_stream_key`]).
pub fn generate_stream_key() -> Result<Zeroizing<[u8; STREAM_KEY_SIZE]>> {
    let mut key = Zeroizing::new([0u8; STREAM_KEY_SIZE]);
    OsRng
        .try_fill_bytes(&mut *key)
        .map_err(|_| Error::RandomnessUnavailable)?;
    Ok(key)
}

/// Derive a stream key from a shared passphrase (password-mode sharing).
pub fn derive_stream_key(
    passphrase: &str,
    salt: &[u8],
) -> Result<Zeroizing<[u8; STREAM_KEY_SIZE]>> {
    crate::crypto::kdf::derive_key(passphrase, salt)
}

/// Encrypt a plaintext source into `IV ‖ ciphertext`, forward only.
///
/// Returns the number of plaintext bytes processed.
pub fn encrypt_stream<R: Read, W: Write>(
    key: &[u8; STREAM_KEY_SIZE],
    mut reader: R,
    mut writer: W,
) -> Result<u64> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|_| Error::RandomnessUnavailable)?;

    writer.write_all(&iv)?;

    let mut cipher = Aes256Ctr::new(key.into(), (&iv).into());
    let mut buf = Zeroizing::new(vec![0u8; IO_BUF_SIZE]);
    let mut total = 0u64;

    loop {
        let n = read_full(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        cipher.apply_keystream(&mut buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }

    writer.flush()?;
    Ok(total)
}

/// Decrypt `IV ‖ ciphertext` forward from counter zero.
///
/// Returns the number of plaintext bytes produced. A source shorter than
/// the IV header fails with [`Error::CorruptStream`].
pub fn decrypt_stream<R: Read, W: Write>(
    key: &[u8; STREAM_KEY_SIZE],
    mut reader: R,
    mut writer: W,
) -> Result<u64> {
    let iv = read_iv(&mut reader)?;

    let mut cipher = Aes256Ctr::new(key.into(), (&iv).into());
    let mut buf = Zeroizing::new(vec![0u8; IO_BUF_SIZE]);
    let mut total = 0u64;

    loop {
        let n = read_full(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        cipher.apply_keystream(&mut buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }

    writer.flush()?;
    Ok(total)
}

/// Random-access decryption over a seekable ciphertext source.
///
/// Offsets are logical plaintext offsets: position 0 is the first
/// plaintext byte, which lives at physical offset [`IV_SIZE`] in the
/// source. Not safe for concurrent use from multiple threads; callers
/// serialize access (single-owner pattern).
pub struct SeekableCipherStream<S> {
    source: S,
    key: Zeroizing<[u8; STREAM_KEY_SIZE]>,
    iv: [u8; IV_SIZE],
    cipher: Aes256Ctr,
    position: u64,
}

impl<S: Read + Seek> SeekableCipherStream<S> {
    /// Wrap a ciphertext source, reading the IV header once.
    ///
    /// Fails with [`Error::CorruptStream`] if the source is shorter than
    /// the header.
    pub fn new(mut source: S, key: &[u8; STREAM_KEY_SIZE]) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let iv = read_iv(&mut source)?;

        let cipher = Aes256Ctr::new(key.into(), (&iv).into());

        Ok(Self {
            source,
            key: Zeroizing::new(*key),
            iv,
            cipher,
            position: 0,
        })
    }

    /// Current logical plaintext offset
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Unwrap, returning the underlying source
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: Read + Seek> Read for SeekableCipherStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.source.read(buf)?;
        self.cipher.apply_keystream(&mut buf[..n]);
        self.position += n as u64;
        Ok(n)
    }
}

impl<S: Read + Seek> Seek for SeekableCipherStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        // Resolve the absolute logical offset. End-relative seeks resolve
        // against the plaintext length: physical length minus the header.
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.position as i128 + delta as i128,
            SeekFrom::End(delta) => {
                let physical = self.source.seek(SeekFrom::End(0))?;
                if physical < IV_SIZE as u64 {
                    return Err(Error::CorruptStream(
                        "source shorter than the IV header".into(),
                    )
                    .into());
                }
                (physical - IV_SIZE as u64) as i128 + delta as i128
            }
        };

        if target < 0 {
            return Err(Error::InvalidOffset.into());
        }
        let target = target as u64;

        self.source.seek(SeekFrom::Start(target + IV_SIZE as u64))?;

        let block_index = target / BLOCK_SIZE as u64;
        let byte_offset = (target % BLOCK_SIZE as u64) as usize;

        // Rebuild the keystream at the containing block, then burn the
        // partial block so the keystream aligns to the exact byte.
        let iv = offset_iv(&self.iv, block_index as u128);
        self.cipher = Aes256Ctr::new((&*self.key).into(), (&iv).into());

        if byte_offset > 0 {
            let mut discard = [0u8; BLOCK_SIZE];
            self.cipher.apply_keystream(&mut discard[..byte_offset]);
        }

        self.position = target;
        Ok(target)
    }
}

/// Add a block count to the IV: 128-bit big-endian addition with carry
/// propagation across all 16 bytes, wrapping on overflow.
fn offset_iv(iv: &[u8; IV_SIZE], blocks: u128) -> [u8; IV_SIZE] {
    u128::from_be_bytes(*iv).wrapping_add(blocks).to_be_bytes()
}

/// Read the 16-byte IV header, mapping a short read to `CorruptStream`.
fn read_iv<R: Read>(reader: &mut R) -> Result<[u8; IV_SIZE]> {
    let mut iv = [0u8; IV_SIZE];
    reader.read_exact(&mut iv).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::CorruptStream("source shorter than the IV header".into())
        } else {
            Error::Io(e)
        }
    })?;
    Ok(iv)
}

/// Fill as much of `buf` as the reader can provide, retrying on
/// interruption. Returns 0 only at end of stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(total)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Deterministic non-repeating test plaintext
    fn test_plaintext(len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let i = i as u64;
                (i.wrapping_mul(31).wrapping_add(i >> 8) & 0xFF) as u8
            })
            .collect()
    }

    fn encrypt_to_vec(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encrypt_stream(key, plaintext, &mut out).unwrap();
        out
    }

    #[test]
    fn test_forward_round_trip() {
        let key = [7u8; 32];

        for len in [0usize, 1, 15, 16, 17, 1000, IO_BUF_SIZE + 5] {
            let plaintext = test_plaintext(len);
            let ciphertext = encrypt_to_vec(&key, &plaintext);
            assert_eq!(ciphertext.len(), IV_SIZE + len);

            let mut decrypted = Vec::new();
            let n = decrypt_stream(&key, &ciphertext[..], &mut decrypted).unwrap();

            assert_eq!(n, len as u64);
            assert_eq!(decrypted, plaintext, "round trip failed at len {}", len);
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let key = [7u8; 32];
        let plaintext = test_plaintext(4096);
        let ciphertext = encrypt_to_vec(&key, &plaintext);

        assert_ne!(&ciphertext[IV_SIZE..], &plaintext[..]);
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let key = [7u8; 32];
        let plaintext = test_plaintext(64);

        let ct1 = encrypt_to_vec(&key, &plaintext);
        let ct2 = encrypt_to_vec(&key, &plaintext);

        assert_ne!(ct1[..IV_SIZE], ct2[..IV_SIZE]);
        assert_ne!(ct1[IV_SIZE..], ct2[IV_SIZE..]);
    }

    #[test]
    fn test_wrong_key_yields_garbage_not_error() {
        // Confidentiality only: a wrong key cannot be detected here, it
        // just produces noise. Integrity belongs to the content address.
        let plaintext = test_plaintext(256);
        let ciphertext = encrypt_to_vec(&[1u8; 32], &plaintext);

        let mut decrypted = Vec::new();
        decrypt_stream(&[2u8; 32], &ciphertext[..], &mut decrypted).unwrap();

        assert_eq!(decrypted.len(), plaintext.len());
        assert_ne!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_truncated_header_fails() {
        let key = [7u8; 32];
        let mut out = Vec::new();

        let result = decrypt_stream(&key, &[0u8; 8][..], &mut out);
        assert!(matches!(result, Err(Error::CorruptStream(_))));
    }

    #[test]
    fn test_seekable_construction_on_short_source_fails() {
        let result = SeekableCipherStream::new(Cursor::new(vec![0u8; 8]), &[7u8; 32]);
        assert!(matches!(result, Err(Error::CorruptStream(_))));
    }

    #[test]
    fn test_seek_read_equals_forward_decrypt_slice() {
        let key = [3u8; 32];
        let plaintext = test_plaintext(100_000);
        let ciphertext = encrypt_to_vec(&key, &plaintext);

        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();

        for &offset in &[0usize, 1, 15, 16, 17, 4099, 65_536, 99_999, 100_000] {
            let pos = stream.seek(SeekFrom::Start(offset as u64)).unwrap();
            assert_eq!(pos, offset as u64);

            let mut rest = Vec::new();
            stream.read_to_end(&mut rest).unwrap();

            assert_eq!(
                rest,
                &plaintext[offset..],
                "seek to {} produced wrong plaintext",
                offset
            );
        }
    }

    #[test]
    fn test_seek_10mib_unaligned_range() {
        let key = [5u8; 32];
        let plaintext = test_plaintext(10 * 1024 * 1024);
        let ciphertext = encrypt_to_vec(&key, &plaintext);

        // Forward decrypt equals the input.
        let mut forward = Vec::new();
        decrypt_stream(&key, &ciphertext[..], &mut forward).unwrap();
        assert_eq!(forward, plaintext);

        // Not block-aligned: 5 MiB + 1.
        let offset = 5_242_881usize;
        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();
        stream.seek(SeekFrom::Start(offset as u64)).unwrap();

        let mut window = [0u8; 100];
        stream.read_exact(&mut window).unwrap();

        assert_eq!(&window[..], &plaintext[offset..offset + 100]);
    }

    #[test]
    fn test_reseek_same_offset_is_idempotent() {
        let key = [9u8; 32];
        let plaintext = test_plaintext(8192);
        let ciphertext = encrypt_to_vec(&key, &plaintext);

        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();

        stream.seek(SeekFrom::Start(1234)).unwrap();
        let mut first = [0u8; 64];
        stream.read_exact(&mut first).unwrap();

        stream.seek(SeekFrom::Start(1234)).unwrap();
        let mut second = [0u8; 64];
        stream.read_exact(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(&first[..], &plaintext[1234..1298]);
    }

    #[test]
    fn test_seek_current_and_end() {
        let key = [11u8; 32];
        let plaintext = test_plaintext(1000);
        let ciphertext = encrypt_to_vec(&key, &plaintext);

        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();

        // Current-relative: land on 500 via 300 + 200.
        stream.seek(SeekFrom::Start(300)).unwrap();
        let pos = stream.seek(SeekFrom::Current(200)).unwrap();
        assert_eq!(pos, 500);

        let mut buf = [0u8; 10];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..], &plaintext[500..510]);

        // End-relative resolves against the plaintext length, not the
        // physical length.
        let pos = stream.seek(SeekFrom::End(-10)).unwrap();
        assert_eq!(pos, 990);

        let mut tail = Vec::new();
        stream.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, &plaintext[990..]);
    }

    #[test]
    fn test_seek_negative_offset_fails() {
        let key = [13u8; 32];
        let ciphertext = encrypt_to_vec(&key, &test_plaintext(100));

        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();

        let err = stream.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        let err = stream.seek(SeekFrom::End(-101)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        // A failed seek must not corrupt subsequent reads.
        stream.seek(SeekFrom::Start(0)).unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, test_plaintext(100));
    }

    #[test]
    fn test_offset_iv_carry_propagation() {
        // Carry must ripple through every byte, not stop at a word edge.
        let iv = [0xFFu8; IV_SIZE];
        assert_eq!(offset_iv(&iv, 1), [0u8; IV_SIZE]);

        let mut iv = [0u8; IV_SIZE];
        iv[15] = 0xFF;
        let mut expected = [0u8; IV_SIZE];
        expected[14] = 1;
        assert_eq!(offset_iv(&iv, 1), expected);

        let iv = [0u8; IV_SIZE];
        let bumped = offset_iv(&iv, 0x0102);
        assert_eq!(bumped[15], 0x02);
        assert_eq!(bumped[14], 0x01);
    }

    #[test]
    fn test_empty_stream_seek() {
        let key = [17u8; 32];
        let ciphertext = encrypt_to_vec(&key, &[]);
        assert_eq!(ciphertext.len(), IV_SIZE);

        let mut stream = SeekableCipherStream::new(Cursor::new(ciphertext), &key).unwrap();
        assert_eq!(stream.seek(SeekFrom::End(0)).unwrap(), 0);

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_generate_stream_key_unique() {
        let k1 = generate_stream_key().unwrap();
        let k2 = generate_stream_key().unwrap();
        assert_ne!(*k1, *k2);
    }

    #[test]
    fn test_derive_stream_key_deterministic() {
        let salt = [1u8; 16];
        let k1 = derive_stream_key("shared phrase", &salt).unwrap();
        let k2 = derive_stream_key("shared phrase", &salt).unwrap();
        assert_eq!(*k1, *k2);
    }
}

//! Metadata Decoder Unit Tests
//!
//! Tests decoding of the metadata side-record prefix:
//! - Update authority at byte 1, name length at byte 65
//! - NUL padding trimmed, empty strings become "N/A"
//! - Truncated or overrunning buffers decode to nothing

use solana_sdk::pubkey::Pubkey;

use spl_custody_analyzer::token::{decode_metadata, derive_metadata_address, METADATA_PREFIX_LEN};

fn push_string(data: &mut Vec<u8>, text: &str, width: usize) {
    let mut field = text.as_bytes().to_vec();
    field.resize(width.max(field.len()), 0);
    data.extend_from_slice(&(field.len() as u32).to_le_bytes());
    data.extend_from_slice(&field);
}

fn account(authority: &Pubkey, name: &str, symbol: &str) -> Vec<u8> {
    let mut data = vec![4u8];
    data.extend_from_slice(authority.as_ref());
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    push_string(&mut data, name, 32);
    push_string(&mut data, symbol, 10);
    push_string(&mut data, "https://arweave.net/meta", 200);
    data.extend_from_slice(&[0u8; 16]);
    data
}

#[test]
fn test_decode_padded_fields() {
    let authority = Pubkey::new_unique();
    let decoded = decode_metadata(&account(&authority, "Bonk", "BONK")).unwrap();

    assert_eq!(decoded.name, "Bonk");
    assert_eq!(decoded.symbol, "BONK");
    assert_eq!(decoded.update_authority, authority.to_string());
}

#[test]
fn test_decode_unpadded_fields() {
    let authority = Pubkey::new_unique();
    let mut data = vec![4u8];
    data.extend_from_slice(authority.as_ref());
    data.extend_from_slice(&[1u8; 32]);
    push_string(&mut data, "Exact", 0);
    push_string(&mut data, "EX", 0);

    let decoded = decode_metadata(&data).unwrap();
    assert_eq!(decoded.name, "Exact");
    assert_eq!(decoded.symbol, "EX");
}

#[test]
fn test_empty_strings_become_sentinel() {
    let decoded = decode_metadata(&account(&Pubkey::new_unique(), "", "")).unwrap();
    assert_eq!(decoded.name, "N/A");
    assert_eq!(decoded.symbol, "N/A");
}

#[test]
fn test_multibyte_names_survive() {
    let decoded = decode_metadata(&account(&Pubkey::new_unique(), "Kōin 🐶", "KOI")).unwrap();
    assert_eq!(decoded.name, "Kōin 🐶");
}

#[test]
fn test_short_buffer_rejected() {
    let data = account(&Pubkey::new_unique(), "Bonk", "BONK");
    assert!(decode_metadata(&data[..METADATA_PREFIX_LEN - 1]).is_none());
    assert!(decode_metadata(&[]).is_none());
}

#[test]
fn test_overrunning_length_rejected() {
    let mut data = account(&Pubkey::new_unique(), "Bonk", "BONK");
    data[65..69].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(decode_metadata(&data).is_none());
}

#[test]
fn test_truncated_symbol_rejected() {
    let data = account(&Pubkey::new_unique(), "Bonk", "BONK");
    // Prefix + name, symbol length cut in half
    let cut = METADATA_PREFIX_LEN + 32 + 2;
    assert!(decode_metadata(&data[..cut]).is_none());
}

#[test]
fn test_invalid_utf8_rejected() {
    let mut data = account(&Pubkey::new_unique(), "Bonk", "BONK");
    data[METADATA_PREFIX_LEN] = 0xFF;
    assert!(decode_metadata(&data).is_none());
}

#[test]
fn test_metadata_address_is_deterministic() {
    let mint = Pubkey::new_unique();
    let (first, bump) = derive_metadata_address(&mint);
    let (second, bump_again) = derive_metadata_address(&mint);

    assert_eq!(first, second);
    assert_eq!(bump, bump_again);
    assert_ne!(first, derive_metadata_address(&Pubkey::new_unique()).0);
}

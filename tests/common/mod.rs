#![allow(dead_code)]

use serde_json::json;
use solana_tx_normalizer::RawTransaction;

pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

pub const SENDER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const RECIPIENT: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const SENDER_ATA: &str = "7UX2i7SucgLMQcfZ75s3VXmZZY4YRUyJN9X1RgfMoDUi";
pub const RECIPIENT_ATA: &str = "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr";

/// System transfer of 1.5 SOL from `SENDER` to `RECIPIENT`, legacy shape.
pub fn legacy_transfer() -> RawTransaction {
    serde_json::from_value(json!({
        "slot": 250_000_000u64,
        "blockTime": 1_700_000_000i64,
        "meta": {
            "err": null,
            "fee": 5000,
            "preBalances": [10_000_000_000u64, 0, 1],
            "postBalances": [8_499_995_000u64, 1_500_000_000u64, 1],
            "preTokenBalances": [],
            "postTokenBalances": []
        },
        "transaction": {
            "signatures": ["legacy-sig"],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 1
                },
                "accountKeys": [SENDER, RECIPIENT, SYSTEM_PROGRAM],
                "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                "instructions": [
                    {"programIdIndex": 2, "accounts": [0, 1], "data": "3Bxs3ztTT2GbRVeo"}
                ]
            }
        }
    }))
    .expect("legacy fixture")
}

/// The same transfer as `legacy_transfer`, versioned shape with byte data.
pub fn versioned_transfer() -> RawTransaction {
    serde_json::from_value(json!({
        "slot": 250_000_000u64,
        "blockTime": 1_700_000_000i64,
        "version": 0,
        "meta": {
            "err": null,
            "fee": 5000,
            "preBalances": [10_000_000_000u64, 0, 1],
            "postBalances": [8_499_995_000u64, 1_500_000_000u64, 1],
            "loadedAddresses": {"writable": [], "readonly": []}
        },
        "transaction": {
            "signatures": ["legacy-sig"],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 1
                },
                "staticAccountKeys": [SENDER, RECIPIENT, SYSTEM_PROGRAM],
                "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                "compiledInstructions": [{
                    "programIdIndex": 2,
                    "accountKeyIndexes": [0, 1],
                    "data": {"type": "Buffer", "data": [2, 0, 0, 0, 0, 47, 104, 89, 0, 0, 0, 0]}
                }]
            }
        }
    }))
    .expect("versioned fixture")
}

/// SPL token transfer of 2.5 USDC from `SENDER_ATA` to `RECIPIENT_ATA`,
/// signed by `SENDER`, followed by an instruction of an unregistered program.
pub fn token_transfer() -> RawTransaction {
    serde_json::from_value(json!({
        "slot": 250_000_001u64,
        "blockTime": 1_700_000_100i64,
        "version": "legacy",
        "meta": {
            "err": null,
            "fee": 5000,
            "preBalances": [10_000_000_000u64, 2_039_280, 2_039_280, 1, 1],
            "postBalances": [9_999_995_000u64, 2_039_280, 2_039_280, 1, 1],
            "preTokenBalances": [{
                "accountIndex": 1,
                "mint": USDC_MINT,
                "owner": SENDER,
                "programId": TOKEN_PROGRAM,
                "uiTokenAmount": {"amount": "10000000", "decimals": 6, "uiAmount": 10.0, "uiAmountString": "10"}
            }, {
                "accountIndex": 2,
                "mint": USDC_MINT,
                "owner": RECIPIENT,
                "programId": TOKEN_PROGRAM,
                "uiTokenAmount": {"amount": "0", "decimals": 6, "uiAmount": null, "uiAmountString": "0"}
            }],
            "postTokenBalances": [{
                "accountIndex": 1,
                "mint": USDC_MINT,
                "owner": SENDER,
                "programId": TOKEN_PROGRAM,
                "uiTokenAmount": {"amount": "7500000", "decimals": 6, "uiAmount": 7.5, "uiAmountString": "7.5"}
            }, {
                "accountIndex": 2,
                "mint": USDC_MINT,
                "owner": RECIPIENT,
                "programId": TOKEN_PROGRAM,
                "uiTokenAmount": {"amount": "2500000", "decimals": 6, "uiAmount": 2.5, "uiAmountString": "2.5"}
            }]
        },
        "transaction": {
            "signatures": ["token-sig"],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 2
                },
                "accountKeys": [SENDER, SENDER_ATA, RECIPIENT_ATA, TOKEN_PROGRAM, "Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo"],
                "instructions": [
                    {"programIdIndex": 3, "accounts": [1, 2, 0], "data": "3gFAscqFEt1m"},
                    {"programIdIndex": 4, "accounts": [0], "data": "5UwZhRq3"}
                ]
            }
        }
    }))
    .expect("token fixture")
}

/// Split one quoted CSV row on field boundaries.
pub fn csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

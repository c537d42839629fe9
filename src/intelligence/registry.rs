//! Static tables of labelled addresses. Entries are stored lowercase and in a
//! fixed order; discovery seeds are taken from the front of each table.

/// Foundations, contracts and large custodial wallets.
pub const KNOWN_ENTITIES: &[(&str, &str)] = &[
    ("0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae", "Ethereum Foundation"),
    ("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH Contract"),
    ("0xa090e606e30bd747d4e6245a1517ebe430f0057e", "Gemini Exchange"),
    ("0x28c6c06298d514db089934071355e5743bf21d60", "Binance Hot Wallet"),
];

/// Exchange hot wallets used for deposit/withdrawal classification.
pub const EXCHANGES: &[(&str, &str)] = &[
    ("0x28c6c06298d514db089934071355e5743bf21d60", "Binance"),
    ("0xa090e606e30bd747d4e6245a1517ebe430f0057e", "Gemini"),
    ("0x6cc5f688a315f3dc28a7781717a9a798a59fda7b", "OKEx"),
    ("0x564286362092d8e7936f0549571a803b203aaced", "FTX"),
    ("0x2910543af39aba0cd09dbb2d50200b3e800a63d2", "Kraken"),
    ("0x71660c4005ba85c37ccec55d0c4493e66fe775d3", "Coinbase"),
];

fn lookup(table: &'static [(&'static str, &'static str)], address: &str) -> Option<&'static str> {
    let key = address.trim();
    table
        .iter()
        .find(|(addr, _)| addr.eq_ignore_ascii_case(key))
        .map(|(_, name)| *name)
}

/// Label for a known entity, matched case-insensitively.
pub fn label_of(address: &str) -> Option<&'static str> {
    lookup(KNOWN_ENTITIES, address)
}

/// Exchange name for a known exchange wallet, matched case-insensitively.
pub fn exchange_of(address: &str) -> Option<&'static str> {
    lookup(EXCHANGES, address)
}

pub fn is_known_entity(address: &str) -> bool {
    label_of(address).is_some()
}

/// Known entities followed by exchanges, duplicates removed, order kept.
pub fn monitored_addresses() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::with_capacity(KNOWN_ENTITIES.len() + EXCHANGES.len());
    for (addr, _) in KNOWN_ENTITIES.iter().chain(EXCHANGES.iter()) {
        if !out.contains(addr) {
            out.push(*addr);
        }
    }
    out
}

use crate::error::{Error, Result};
use crate::models::Platform;

/// Classifies a contract address by shape into the list of platforms to
/// try, in trial order. Hex-prefixed 42-character addresses are looked
/// up on the EVM chains; 32-44 character addresses without the hex
/// prefix are treated as Solana.
pub fn detect_platforms(address: &str) -> Result<Vec<Platform>> {
    if address.starts_with("0x") && address.len() == 42 {
        Ok(vec![
            Platform::Ethereum,
            Platform::PolygonPos,
            Platform::BinanceSmartChain,
        ])
    } else if address.len() >= 32 && address.len() <= 44 && !address.starts_with("0x") {
        Ok(vec![Platform::Solana])
    } else {
        Err(Error::UnsupportedFormat(format!(
            "'{}' is neither an Ethereum (0x...) nor a Solana address",
            address
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_address_tries_chains_in_order() {
        let platforms =
            detect_platforms("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap();
        assert_eq!(
            platforms,
            vec![
                Platform::Ethereum,
                Platform::PolygonPos,
                Platform::BinanceSmartChain,
            ]
        );
    }

    #[test]
    fn test_base58_shaped_address_maps_to_solana() {
        let platforms =
            detect_platforms("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap();
        assert_eq!(platforms, vec![Platform::Solana]);
    }

    #[test]
    fn test_short_hex_address_is_unsupported() {
        let err = detect_platforms("0x6b1754").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_long_hex_address_is_unsupported() {
        // 44 chars with the 0x prefix: too long for EVM, excluded from
        // the Solana branch by the prefix.
        let err = detect_platforms("0x6b175474e89094c44da98b954eedeac495271d0f00").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_address_is_unsupported() {
        assert!(detect_platforms("").is_err());
    }
}

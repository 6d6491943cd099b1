//! Static provider registry.
//!
//! Providers are configuration, loaded once at startup. The stable ids are
//! part of the store contract (they key the `external_ids` map and the
//! `current_odds` primary key) and must never be reused.

use crate::types::ProviderId;

/// How an adapter reaches its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDriver {
    /// Plain reqwest HTTP session.
    PlainHttp,
    /// Headless-browser session, for upstreams behind anti-bot challenges.
    Browser,
}

/// One registered upstream sportsbook.
#[derive(Debug, Clone, Copy)]
pub struct ProviderInfo {
    pub id: ProviderId,
    /// Short machine name, used in config (`providers_enabled`) and logs.
    pub name: &'static str,
    pub display: &'static str,
    /// Default enabled state; `providers_enabled` in config overrides.
    pub enabled: bool,
    pub driver: FetchDriver,
}

/// The known providers. Append-only; ids are never reused.
pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: ProviderId(1),
        name: "mozzart",
        display: "Mozzart Bet",
        enabled: true,
        driver: FetchDriver::Browser,
    },
    ProviderInfo {
        id: ProviderId(3),
        name: "maxbet",
        display: "MaxBet",
        enabled: true,
        driver: FetchDriver::PlainHttp,
    },
    ProviderInfo {
        id: ProviderId(4),
        name: "admiral",
        display: "Admiral Bet",
        enabled: true,
        driver: FetchDriver::PlainHttp,
    },
    ProviderInfo {
        id: ProviderId(5),
        name: "soccerbet",
        display: "Soccer Bet",
        enabled: true,
        driver: FetchDriver::PlainHttp,
    },
    ProviderInfo {
        id: ProviderId(6),
        name: "superbet",
        display: "SuperBet",
        enabled: true,
        driver: FetchDriver::PlainHttp,
    },
];

/// Looks a provider up by its short name.
#[must_use]
pub fn provider_by_name(name: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// Looks a provider up by id.
#[must_use]
pub fn provider_by_id(id: ProviderId) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_provider_ids_unique() {
        let ids: HashSet<_> = PROVIDERS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PROVIDERS.len());
    }

    #[test]
    fn test_provider_names_unique() {
        let names: HashSet<_> = PROVIDERS.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PROVIDERS.len());
    }

    #[test]
    fn test_lookup_by_name() {
        let maxbet = provider_by_name("maxbet").unwrap();
        assert_eq!(maxbet.id, ProviderId(3));
        assert_eq!(maxbet.driver, FetchDriver::PlainHttp);

        assert!(provider_by_name("nosuchbook").is_none());
    }

    #[test]
    fn test_browser_driver_flag() {
        let mozzart = provider_by_name("mozzart").unwrap();
        assert_eq!(mozzart.driver, FetchDriver::Browser);
    }
}

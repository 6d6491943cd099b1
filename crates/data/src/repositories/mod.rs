pub mod arbitrage_repo;
pub mod match_repo;
pub mod odds_repo;

pub use arbitrage_repo::ArbitrageRepository;
pub use match_repo::MatchRepository;
pub use odds_repo::OddsRepository;

pub mod codes;
pub mod detail;
pub mod eastmoney;
pub mod html;
pub mod rank;
pub mod risk;
pub mod util;

// Re-export the collectors for cleaner imports
pub use codes::FundListCollector;
pub use detail::DetailCollector;
pub use eastmoney::EastmoneyClient;
pub use rank::RankCollector;
pub use risk::RiskStatsCollector;

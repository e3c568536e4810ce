pub mod catalog;
pub mod error;
pub mod normalize;
pub mod ranking;
pub mod record;
pub mod regulator;
pub mod slug;
mod value;

pub use catalog::{BrokerCatalog, HomeViews};
pub use error::RecordError;
pub use normalize::{normalize, normalize_all};
pub use ranking::{RiskBadge, SortOrder};
pub use record::{BrokerInfo, BrokerRecord, Faq, ProsAndCons, RawBrokerRecord, SafetyInfo, WhyChoose};
pub use regulator::{RegulatorSet, extract_regulators};
pub use slug::broker_name_to_slug;

//! Store tests
//!
//! Both stores share the same contract; each file exercises one
//! implementation against it.


pub mod common {
    use chrono::Utc;
    use shared::Tournament;

    use crate::core::progression::create_tournament;
    use crate::core::test_support::sample_config;

    /// A fresh `setup` tournament with revision 0
    pub fn new_tournament() -> Tournament {
        create_tournament(sample_config(), Utc::now()).expect("sample config is valid")
    }
}

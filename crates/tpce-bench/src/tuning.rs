use tpce_core::Tuner;
use tpce_model::TuningDirective;

pub const CONCURRENT_ADDSSTABLE_REQUESTS: &str = "kv.bulk_io_write.concurrent_addsstable_requests";
pub const AUTOMATIC_STATS_COLLECTION: &str = "sql.stats.automatic_collection.enabled";

/// Settings that speed up the initial dataset import.
pub fn bulk_load_directives(ssds: u32) -> Vec<TuningDirective> {
    vec![
        TuningDirective::new(CONCURRENT_ADDSSTABLE_REQUESTS, 4 * i64::from(ssds)),
        TuningDirective::new(AUTOMATIC_STATS_COLLECTION, false),
    ]
}

pub fn bulk_load_tuner(ssds: u32) -> Tuner {
    Tuner::new(bulk_load_directives(ssds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addsstable_limit_scales_with_ssds() {
        let statements: Vec<_> = bulk_load_directives(2).iter().map(|d| d.statement()).collect();
        assert_eq!(
            statements,
            vec![
                "SET CLUSTER SETTING kv.bulk_io_write.concurrent_addsstable_requests = 8",
                "SET CLUSTER SETTING sql.stats.automatic_collection.enabled = false",
            ]
        );
    }
}

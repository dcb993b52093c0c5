use tpce_core::ResultValidator;

/// Printed by the generator when measured tpsE falls outside 80-100% of target.
pub const TPCE_MARKER: &str = "Reported tpsE :    --   (not between 80% and 100%)";

pub const TPCE_VALIDATOR: ResultValidator = ResultValidator::new(TPCE_MARKER, "invalid tpsE fraction");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_line_fails_with_tpse_reason() {
        let out = "Measured tpsE: 912\nReported tpsE :    --   (not between 80% and 100%)\n";
        assert_eq!(TPCE_VALIDATOR.check(out).unwrap_err().reason, "invalid tpsE fraction");
    }

    #[test]
    fn collapsed_whitespace_is_not_the_marker() {
        assert!(TPCE_VALIDATOR.check("Reported tpsE : -- (not between 80% and 100%)").is_ok());
        assert!(TPCE_VALIDATOR.check("Reported tpsE :    --   (not between 80%").is_ok());
    }
}

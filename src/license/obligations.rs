use crate::models::{Obligation, ObligationScope, ObligationSeverity, ObligationType};

/// Static detail record for an obligation type.
pub fn obligation_details(kind: ObligationType) -> Obligation {
    let (description, severity, scope) = match kind {
        ObligationType::Attribution => (
            "Credit the original authors and include the license text in distributions",
            ObligationSeverity::Low,
            ObligationScope::Distribution,
        ),
        ObligationType::NoticePreservation => (
            "Preserve existing copyright and license notices",
            ObligationSeverity::Low,
            ObligationScope::Distribution,
        ),
        ObligationType::PatentGrant => (
            "Patent license is granted and terminates on patent litigation",
            ObligationSeverity::Medium,
            ObligationScope::Patents,
        ),
        ObligationType::ShareAlike => (
            "Adaptations must be shared under the same terms",
            ObligationSeverity::Medium,
            ObligationScope::DerivativeWorks,
        ),
        ObligationType::Copyleft => (
            "Derivative works must be distributed under the same license",
            ObligationSeverity::High,
            ObligationScope::DerivativeWorks,
        ),
        ObligationType::DiscloseSource => (
            "Source code must be made available when distributing",
            ObligationSeverity::High,
            ObligationScope::Distribution,
        ),
        ObligationType::SameLicense => (
            "Modifications must be released under the same license",
            ObligationSeverity::High,
            ObligationScope::Modifications,
        ),
        ObligationType::NoCommercialUse => (
            "Commercial use is not permitted",
            ObligationSeverity::Critical,
            ObligationScope::Usage,
        ),
    };

    Obligation {
        kind,
        description: description.to_string(),
        severity,
        scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_match_type() {
        let o = obligation_details(ObligationType::DiscloseSource);
        assert_eq!(o.kind, ObligationType::DiscloseSource);
        assert_eq!(o.severity, ObligationSeverity::High);
        assert_eq!(o.scope, ObligationScope::Distribution);
    }

    #[test]
    fn test_no_commercial_use_is_critical() {
        assert_eq!(
            obligation_details(ObligationType::NoCommercialUse).severity,
            ObligationSeverity::Critical
        );
    }
}

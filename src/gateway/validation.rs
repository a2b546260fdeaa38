//! Query validation: required parameters and defaults, checked before any
//! outbound call is attempted.

use std::collections::BTreeMap;

use crate::error::GatewayError;
use crate::gateway::models::{LogicalRequest, Param, ResolvedParams};
use crate::gateway::routes::OperationRule;

/// Validates a logical request against its operation rule.
///
/// # Arguments
/// * `rule` - The operation's rule, supplying required parameters and defaults
/// * `request` - The inbound logical request
///
/// # Returns
/// * `Ok(ResolvedParams)` - Supplied parameters plus defaults for absent optional ones
/// * `Err(GatewayError::MissingParameter)` - Names every absent required parameter,
///   in the order the rule declares them
/// * `Err(GatewayError::InvalidParameter)` - A path-bound value is `.` or `..`,
///   which a URL path would collapse into a different resource
pub fn validate(
    rule: &OperationRule,
    request: &LogicalRequest,
) -> Result<ResolvedParams, GatewayError> {
    let missing: Vec<Param> = rule
        .required
        .iter()
        .copied()
        .filter(|param| request.get(*param).is_none())
        .collect();

    if !missing.is_empty() {
        return Err(GatewayError::missing_parameter(
            rule.operation.as_str(),
            missing,
            rule.usage,
        ));
    }

    let mut values: BTreeMap<Param, String> = request.params().clone();
    for (param, default) in rule.defaults {
        values
            .entry(*param)
            .or_insert_with(|| (*default).to_string());
    }

    for endpoint in rule.plan.endpoints() {
        for name in endpoint.path_placeholders() {
            let Ok(param) = name.parse::<Param>() else {
                continue;
            };
            if let Some(value) = values.get(&param)
                && is_dot_segment(value)
            {
                return Err(GatewayError::invalid_parameter(param, value, rule.usage));
            }
        }
    }

    Ok(ResolvedParams::from_map(values))
}

/// `.` and `..` are removed or resolved by URL path normalization.
pub(crate) fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::models::Operation;
    use crate::gateway::routes::rule_for;

    #[test]
    fn test_nba_requires_player_and_season() {
        let rule = rule_for(Operation::NbaPlayerStats);
        let request = LogicalRequest::new(Operation::NbaPlayerStats);

        let err = validate(rule, &request).unwrap_err();

        match err {
            GatewayError::MissingParameter {
                operation, missing, ..
            } => {
                assert_eq!(operation, "nba.player_stats");
                assert_eq!(missing, vec![Param::Player, Param::Season]);
            }
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_reports_only_absent_parameters() {
        let rule = rule_for(Operation::SoccerPlayerStats);
        let request =
            LogicalRequest::new(Operation::SoccerPlayerStats).with_param(Param::Player, "haaland");

        let err = validate(rule, &request).unwrap_err();

        assert!(matches!(
            err,
            GatewayError::MissingParameter { ref missing, .. }
                if missing == &vec![Param::League, Param::Season]
        ));
    }

    #[test]
    fn test_valid_request_keeps_supplied_values() {
        let rule = rule_for(Operation::SoccerFixtures);
        let request = LogicalRequest::new(Operation::SoccerFixtures)
            .with_param(Param::League, "39")
            .with_param(Param::Season, "2023")
            .with_param(Param::Player, "ignored but kept");

        let resolved = validate(rule, &request).unwrap();

        assert_eq!(resolved.get(Param::League), Some("39"));
        assert_eq!(resolved.get(Param::Season), Some("2023"));
    }

    #[test]
    fn test_football_data_defaults_competition() {
        let rule = rule_for(Operation::SoccerFixturesFootballData);
        let request = LogicalRequest::new(Operation::SoccerFixturesFootballData);

        let resolved = validate(rule, &request).unwrap();

        assert_eq!(resolved.get(Param::Competition), Some("PL"));
    }

    #[test]
    fn test_supplied_value_wins_over_default() {
        let rule = rule_for(Operation::Odds);
        let request = LogicalRequest::new(Operation::Odds).with_param(Param::Sport, "soccer_epl");

        let resolved = validate(rule, &request).unwrap();

        assert_eq!(resolved.get(Param::Sport), Some("soccer_epl"));
        assert_eq!(resolved.get(Param::Region), Some("us"));
        assert_eq!(resolved.get(Param::Market), Some("h2h"));
    }

    #[test]
    fn test_dot_segment_in_path_parameter_is_rejected() {
        for (operation, param) in [
            (Operation::SoccerFixturesFootballData, Param::Competition),
            (Operation::Odds, Param::Sport),
        ] {
            for value in [".", ".."] {
                let request = LogicalRequest::new(operation).with_param(param, value);

                let err = validate(rule_for(operation), &request).unwrap_err();

                assert_eq!(
                    err,
                    GatewayError::invalid_parameter(param, value, rule_for(operation).usage)
                );
            }
        }
    }

    #[test]
    fn test_dots_are_allowed_outside_path_segments() {
        let rule = rule_for(Operation::Odds);
        let request = LogicalRequest::new(Operation::Odds)
            .with_param(Param::Sport, "soccer_epl")
            .with_param(Param::Region, "..")
            .with_param(Param::Competition, "..");

        let resolved = validate(rule, &request).unwrap();

        assert_eq!(resolved.get(Param::Region), Some(".."));
    }

    #[test]
    fn test_esports_requires_player() {
        let rule = rule_for(Operation::EsportsPlayerStats);
        let err = validate(rule, &LogicalRequest::new(Operation::EsportsPlayerStats)).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::MissingParameter);
        assert!(err.to_string().contains("player"));
    }
}

//! Request-side data types: parameters, operations and logical requests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Query parameters understood by the gateway. Anything else on the inbound
/// query string is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    Player,
    Season,
    League,
    Competition,
    Sport,
    Region,
    Market,
}

impl Param {
    pub const ALL: [Param; 7] = [
        Param::Player,
        Param::Season,
        Param::League,
        Param::Competition,
        Param::Sport,
        Param::Region,
        Param::Market,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Param::Player => "player",
            Param::Season => "season",
            Param::League => "league",
            Param::Competition => "competition",
            Param::Sport => "sport",
            Param::Region => "region",
            Param::Market => "market",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Param {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// Logical operations exposed by the gateway, one per provider-backed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// NBA season averages via balldontlie (search, then fetch by id)
    NbaPlayerStats,
    /// Player statistics via API-Football
    SoccerPlayerStats,
    /// League fixtures via API-Football
    SoccerFixtures,
    /// Competition matches via football-data.org
    SoccerFixturesFootballData,
    /// Player lookup via PandaScore
    EsportsPlayerStats,
    /// Betting odds via The Odds API
    Odds,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::NbaPlayerStats,
        Operation::SoccerPlayerStats,
        Operation::SoccerFixtures,
        Operation::SoccerFixturesFootballData,
        Operation::EsportsPlayerStats,
        Operation::Odds,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::NbaPlayerStats => "nba.player_stats",
            Operation::SoccerPlayerStats => "soccer.player_stats",
            Operation::SoccerFixtures => "soccer.fixtures",
            Operation::SoccerFixturesFootballData => "soccer.fixtures.football_data",
            Operation::EsportsPlayerStats => "esports.player_stats",
            Operation::Odds => "odds",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation '{s}'"))
    }
}

/// One inbound call: the operation plus whatever known parameters the client
/// supplied. Blank values are dropped on construction so that `?player=`
/// counts as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRequest {
    operation: Operation,
    params: BTreeMap<Param, String>,
}

impl LogicalRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            params: BTreeMap::new(),
        }
    }

    /// Builds a request from a raw query map, keeping only recognised keys.
    pub fn from_query(operation: Operation, query: &HashMap<String, String>) -> Self {
        query
            .iter()
            .filter_map(|(key, value)| key.parse::<Param>().ok().map(|p| (p, value)))
            .fold(Self::new(operation), |request, (param, value)| {
                request.with_param(param, value.as_str())
            })
    }

    pub fn with_param(mut self, param: Param, value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.params.insert(param, trimmed.to_string());
        }
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn get(&self, param: Param) -> Option<&str> {
        self.params.get(&param).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<Param, String> {
        &self.params
    }
}

/// Parameters after validation: every required parameter is present and every
/// declared default has been filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParams {
    values: BTreeMap<Param, String>,
}

impl ResolvedParams {
    pub(crate) fn from_map(values: BTreeMap<Param, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, param: Param) -> Option<&str> {
        self.values.get(&param).map(String::as_str)
    }

    /// Looks a template placeholder up by parameter name.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        name.parse::<Param>().ok().and_then(|p| self.get(p))
    }
}

/// Result of the search phase of a two-phase lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Identifier of the first match in provider order
    Found(String),
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_round_trips_through_name() {
        for param in Param::ALL {
            assert_eq!(param.as_str().parse::<Param>(), Ok(param));
        }
        assert!("team".parse::<Param>().is_err());
    }

    #[test]
    fn test_operation_names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
        assert_eq!(
            "soccer.fixtures.football_data".parse::<Operation>(),
            Ok(Operation::SoccerFixturesFootballData)
        );
    }

    #[test]
    fn test_from_query_ignores_unknown_and_blank_values() {
        let query: HashMap<String, String> = [
            ("player", "lebron james"),
            ("season", "   "),
            ("page", "2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let request = LogicalRequest::from_query(Operation::NbaPlayerStats, &query);

        assert_eq!(request.operation(), Operation::NbaPlayerStats);
        assert_eq!(request.get(Param::Player), Some("lebron james"));
        assert_eq!(request.get(Param::Season), None);
        assert_eq!(request.params().len(), 1);
    }

    #[test]
    fn test_with_param_trims_values() {
        let request = LogicalRequest::new(Operation::Odds).with_param(Param::Sport, " nba ");
        assert_eq!(request.get(Param::Sport), Some("nba"));
    }

    #[test]
    fn test_resolved_params_lookup_by_name() {
        let resolved = ResolvedParams::from_map(
            [(Param::Season, "2022".to_string())].into_iter().collect(),
        );
        assert_eq!(resolved.lookup("season"), Some("2022"));
        assert_eq!(resolved.lookup("player"), None);
        assert_eq!(resolved.lookup("id"), None);
    }
}

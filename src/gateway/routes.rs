//! Declarative operation table.
//!
//! Every logical operation is described by exactly one [`OperationRule`]:
//! which provider serves it, which parameters it needs, what it defaults,
//! how provider failures surface, and whether it is a single call or a
//! search-then-fetch lookup. The dispatcher reads this table and nothing
//! else, so adding an operation means adding a row here.

use std::collections::BTreeSet;

use crate::constants::defaults;
use crate::error::AppError;
use crate::gateway::models::{Operation, Param};
use crate::gateway::providers::ProviderId;
use crate::gateway::template::placeholders;

/// Placeholder bound to the identifier extracted by the search phase.
pub const LOOKUP_ID_PLACEHOLDER: &str = "id";

/// How a provider's non-2xx status is surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Forward the provider's 4xx/5xx status as the gateway's own status
    ForwardProvider,
    /// Always answer provider failures with 500
    AlwaysInternal,
}

/// Location of the list of matches in a provider body, and the domain error
/// to report when that list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchList {
    /// JSON pointer to the array; `""` is the document root
    pub pointer: &'static str,
    pub not_found: &'static str,
}

/// One provider endpoint, relative to the provider's base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Short label used in logs and error messages, e.g. "search"
    pub label: &'static str,
    pub path: &'static str,
    pub query: &'static [(&'static str, &'static str)],
    /// When set, a 2xx body with an empty match list is a `NotFound`
    pub matches: Option<MatchList>,
}

impl Endpoint {
    fn templates(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.path).chain(self.query.iter().map(|(_, v)| *v))
    }

    /// Placeholder names substituted into path segments.
    pub fn path_placeholders(&self) -> Vec<&'static str> {
        // verify_routes rejects malformed templates at startup
        placeholders(self.path).unwrap_or_default()
    }
}

/// Search by name, then fetch by the first match's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPhaseLookup {
    pub search: Endpoint,
    pub matches: MatchList,
    /// Field of a match entry holding its identifier
    pub id_field: &'static str,
    /// Follow-up call; may reference `{id}`
    pub resolve: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Single(Endpoint),
    TwoPhase(TwoPhaseLookup),
}

impl Plan {
    /// Every endpoint the plan may call, in call order.
    pub fn endpoints(&self) -> Vec<&Endpoint> {
        match self {
            Plan::Single(endpoint) => vec![endpoint],
            Plan::TwoPhase(lookup) => vec![&lookup.search, &lookup.resolve],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRule {
    pub operation: Operation,
    pub provider: ProviderId,
    pub required: &'static [Param],
    pub defaults: &'static [(Param, &'static str)],
    pub status_policy: StatusPolicy,
    /// Example request shown when required parameters are missing
    pub usage: &'static str,
    pub plan: Plan,
}

const PLAYER_NOT_FOUND: &str = "Player not found";

pub static ROUTES: &[OperationRule] = &[
    OperationRule {
        operation: Operation::NbaPlayerStats,
        provider: ProviderId::Balldontlie,
        required: &[Param::Player, Param::Season],
        defaults: &[],
        status_policy: StatusPolicy::AlwaysInternal,
        usage: "/nba/player_stats?player=lebron%20james&season=2022",
        plan: Plan::TwoPhase(TwoPhaseLookup {
            search: Endpoint {
                label: "search",
                path: "/players",
                query: &[("search", "{player}")],
                matches: None,
            },
            matches: MatchList {
                pointer: "/data",
                not_found: PLAYER_NOT_FOUND,
            },
            id_field: "id",
            resolve: Endpoint {
                label: "season averages",
                path: "/season_averages",
                query: &[("season", "{season}"), ("player_ids[]", "{id}")],
                matches: None,
            },
        }),
    },
    OperationRule {
        operation: Operation::SoccerPlayerStats,
        provider: ProviderId::ApiFootball,
        required: &[Param::Player, Param::League, Param::Season],
        defaults: &[],
        status_policy: StatusPolicy::ForwardProvider,
        usage: "/soccer/player_stats?player=haaland&league=39&season=2023",
        plan: Plan::Single(Endpoint {
            label: "player statistics",
            path: "/players",
            query: &[
                ("search", "{player}"),
                ("league", "{league}"),
                ("season", "{season}"),
            ],
            matches: Some(MatchList {
                pointer: "/response",
                not_found: PLAYER_NOT_FOUND,
            }),
        }),
    },
    OperationRule {
        operation: Operation::SoccerFixtures,
        provider: ProviderId::ApiFootball,
        required: &[Param::League, Param::Season],
        defaults: &[],
        status_policy: StatusPolicy::ForwardProvider,
        usage: "/soccer/fixtures?league=39&season=2023",
        plan: Plan::Single(Endpoint {
            label: "fixtures",
            path: "/fixtures",
            query: &[("league", "{league}"), ("season", "{season}")],
            matches: None,
        }),
    },
    OperationRule {
        operation: Operation::SoccerFixturesFootballData,
        provider: ProviderId::FootballData,
        required: &[],
        defaults: &[(Param::Competition, defaults::COMPETITION)],
        status_policy: StatusPolicy::ForwardProvider,
        usage: "/soccer/fixtures/football-data?competition=PL",
        plan: Plan::Single(Endpoint {
            label: "competition matches",
            path: "/competitions/{competition}/matches",
            query: &[],
            matches: None,
        }),
    },
    OperationRule {
        operation: Operation::EsportsPlayerStats,
        provider: ProviderId::PandaScore,
        required: &[Param::Player],
        defaults: &[],
        status_policy: StatusPolicy::ForwardProvider,
        usage: "/esports/player_stats?player=faker",
        plan: Plan::Single(Endpoint {
            label: "player search",
            path: "/players",
            query: &[("search[name]", "{player}")],
            matches: Some(MatchList {
                pointer: "",
                not_found: PLAYER_NOT_FOUND,
            }),
        }),
    },
    OperationRule {
        operation: Operation::Odds,
        provider: ProviderId::TheOddsApi,
        required: &[],
        defaults: &[
            (Param::Sport, defaults::ODDS_SPORT),
            (Param::Region, defaults::ODDS_REGION),
            (Param::Market, defaults::ODDS_MARKET),
        ],
        status_policy: StatusPolicy::ForwardProvider,
        usage: "/odds?sport=basketball_nba&region=us&market=h2h",
        plan: Plan::Single(Endpoint {
            label: "odds",
            path: "/sports/{sport}/odds",
            query: &[("regions", "{region}"), ("markets", "{market}")],
            matches: None,
        }),
    },
];

/// Returns the rule for an operation.
pub fn rule_for(operation: Operation) -> &'static OperationRule {
    ROUTES
        .iter()
        .find(|rule| rule.operation == operation)
        .unwrap_or_else(|| panic!("no route rule for operation {operation}"))
}

/// Checks the route table once at startup: one rule per operation, and every
/// template placeholder bound by a required parameter, a default, or (in the
/// resolve phase) the looked-up identifier.
pub fn verify_routes(routes: &[OperationRule]) -> Result<(), AppError> {
    for operation in Operation::ALL {
        let count = routes.iter().filter(|r| r.operation == operation).count();
        if count != 1 {
            return Err(AppError::config_error(format!(
                "Operation {operation} has {count} route rules, expected exactly one"
            )));
        }
    }

    for rule in routes {
        let bound: BTreeSet<&str> = rule
            .required
            .iter()
            .copied()
            .chain(rule.defaults.iter().map(|(p, _)| *p))
            .map(Param::as_str)
            .collect();

        let check = |endpoint: &Endpoint, extra: Option<&str>| -> Result<(), AppError> {
            for template in endpoint.templates() {
                let names = placeholders(template)
                    .map_err(|e| AppError::config_error(format!("{}: {e}", rule.operation)))?;
                for name in names {
                    if !bound.contains(name) && Some(name) != extra {
                        return Err(AppError::config_error(format!(
                            "Operation {} uses placeholder '{{{name}}}' in its {} endpoint without a required parameter or default",
                            rule.operation, endpoint.label
                        )));
                    }
                }
            }
            Ok(())
        };

        match &rule.plan {
            Plan::Single(endpoint) => check(endpoint, None)?,
            Plan::TwoPhase(lookup) => {
                check(&lookup.search, None)?;
                check(&lookup.resolve, Some(LOOKUP_ID_PLACEHOLDER))?;
            }
        }
    }
    Ok(())
}

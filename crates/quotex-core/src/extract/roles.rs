//! Column role detection over ambiguous, bilingual header labels.

use std::fmt;

use tracing::{debug, warn};

/// Semantic meaning of a column, independent of its literal header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sku,
    Description,
    Quantity,
    UnitPrice,
    TotalPrice,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Sku,
        Role::Description,
        Role::Quantity,
        Role::UnitPrice,
        Role::TotalPrice,
    ];

    /// Synonyms in priority order, specific before generic.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Role::Sku => &[
                "sku",
                "part number",
                "part no",
                "part#",
                "p/n",
                "product code",
                "catalog number",
                "item",
                "product",
                "מק\"ט",
                "קוד מוצר",
                "מוצר",
            ],
            Role::Description => &[
                "description",
                "item description",
                "desc",
                "details",
                "תיאור",
                "פירוט",
                "מוצר",
            ],
            Role::Quantity => &["quantity", "qty", "amount", "כמות", "מספר"],
            Role::UnitPrice => &[
                "unit price",
                "unit cost",
                "price per unit",
                "price",
                "cost",
                "מחיר יחידה",
                "מחיר ליחידה",
                "מחיר",
            ],
            Role::TotalPrice => &[
                "total price",
                "line total",
                "extended",
                "total",
                "סה\"כ שורה",
                "סה\"כ",
            ],
        }
    }

    /// Roles extraction cannot do without.
    pub fn is_required(&self) -> bool {
        matches!(self, Role::Sku | Role::Description | Role::Quantity)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Sku => "sku",
            Role::Description => "description",
            Role::Quantity => "quantity",
            Role::UnitPrice => "unit_price",
            Role::TotalPrice => "total_price",
        };
        f.write_str(name)
    }
}

/// Role to column index for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoleMap {
    pub sku: Option<usize>,
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub unit_price: Option<usize>,
    pub total_price: Option<usize>,
}

impl ColumnRoleMap {
    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::Sku => self.sku,
            Role::Description => self.description,
            Role::Quantity => self.quantity,
            Role::UnitPrice => self.unit_price,
            Role::TotalPrice => self.total_price,
        }
    }

    pub fn set(&mut self, role: Role, column: Option<usize>) {
        let slot = match role {
            Role::Sku => &mut self.sku,
            Role::Description => &mut self.description,
            Role::Quantity => &mut self.quantity,
            Role::UnitPrice => &mut self.unit_price,
            Role::TotalPrice => &mut self.total_price,
        };
        *slot = column;
    }

    /// Required roles with no column.
    pub fn missing_required(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| r.is_required() && self.get(*r).is_none())
            .collect()
    }

    /// Whether a column is taken by sku, description or quantity.
    pub fn is_identity_column(&self, column: usize) -> bool {
        [self.sku, self.description, self.quantity].contains(&Some(column))
    }

    /// Whether any role points at the column.
    pub fn is_claimed(&self, column: usize) -> bool {
        Role::ALL.iter().any(|r| self.get(*r) == Some(column))
    }
}

/// Case-folded, trimmed label with Hebrew gershayim unified to `"`.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace('״', "\"")
}

/// Find the column for a synonym list.
///
/// Synonyms are tried in priority order. For each one an exact match is
/// tried first, then a substring match in either direction; the first hit
/// is returned.
pub fn find_column(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    find_column_excluding(headers, synonyms, &[])
}

fn find_column_excluding(headers: &[String], synonyms: &[&str], exclude: &[usize]) -> Option<usize> {
    let normalized: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .map(|(i, h)| (i, normalize_label(h)))
        .filter(|(_, h)| !h.is_empty())
        .collect();

    synonyms.iter().find_map(|synonym| {
        let synonym = normalize_label(synonym);
        normalized
            .iter()
            .find(|(_, h)| *h == synonym)
            .or_else(|| {
                normalized
                    .iter()
                    .find(|(_, h)| h.contains(&synonym) || synonym.contains(h.as_str()))
            })
            .map(|(i, _)| *i)
    })
}

/// Header fragments that mark a column as a line total.
const TOTAL_MARKERS: [&str; 3] = ["total", "extended", "סה\"כ"];

/// Every synonym of every role, for header row detection.
pub fn header_keywords() -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for role in Role::ALL {
        for synonym in role.synonyms() {
            let synonym = normalize_label(synonym);
            if !keywords.contains(&synonym) {
                keywords.push(synonym);
            }
        }
    }
    keywords
}

/// Outcome of role detection for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetection {
    pub roles: ColumnRoleMap,
    /// Required roles that no header resolved to.
    pub missing: Vec<Role>,
}

/// Maps table headers to semantic roles.
#[derive(Debug, Clone, Default)]
pub struct RoleDetector;

impl RoleDetector {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every role against the headers. Missing required roles are
    /// reported in the result rather than raised.
    pub fn detect(&self, headers: &[String]) -> RoleDetection {
        let mut roles = ColumnRoleMap::default();

        for role in Role::ALL {
            let column = match role {
                // "Total Price" must not be claimed by the generic "price"
                Role::UnitPrice => {
                    let exclude: Vec<usize> = headers
                        .iter()
                        .enumerate()
                        .filter(|(_, h)| {
                            let h = normalize_label(h);
                            TOTAL_MARKERS.iter().any(|m| h.contains(m))
                        })
                        .map(|(i, _)| i)
                        .collect();
                    find_column_excluding(headers, role.synonyms(), &exclude)
                }
                Role::TotalPrice => {
                    let exclude: Vec<usize> = roles.unit_price.into_iter().collect();
                    find_column_excluding(headers, role.synonyms(), &exclude)
                }
                _ => find_column(headers, role.synonyms()),
            };
            roles.set(role, column);
        }

        let missing = roles.missing_required();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(Role::to_string).collect();
            warn!("Unresolved required column roles: {}", names.join(", "));
        }
        debug!(?roles, "Column roles detected");

        RoleDetection { roles, missing }
    }

    /// Degraded mode: when sku or description is unresolved, take them
    /// positionally from the first unclaimed columns.
    pub fn with_positional_fallback(&self, mut roles: ColumnRoleMap, width: usize) -> ColumnRoleMap {
        if roles.sku.is_some() && roles.description.is_some() {
            return roles;
        }

        let mut free = (0..width).filter(|c| !roles.is_claimed(*c)).collect::<Vec<_>>().into_iter();
        if roles.sku.is_none() {
            roles.sku = free.next();
        }
        if roles.description.is_none() {
            roles.description = free.next();
        }
        debug!(?roles, "Applied positional fallback");
        roles
    }
}

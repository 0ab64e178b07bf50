use std::collections::BTreeMap;

use uuid::Uuid;

use super::limits::PageLimits;
use super::QueryError;

/// Reserved query-string keys that shape the query instead of filtering it
pub const CONTROL_PARAMS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Column every projection must include
const ID_COLUMN: &str = "id";

/// Default sort when the request does not ask for one: newest first
const CREATED_AT_COLUMN: &str = "created_at";

/// Comparison operator applied to a single filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "gte" => Some(Self::Gte),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Filter value typed by inspection of the raw string
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl FilterValue {
    fn parse(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<f64>() {
            return Self::Number(n);
        }
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }
}

/// A single criterion on a resource field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: Comparison,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// The fully translated query: an immutable description of what to fetch.
/// The store turns this into a single SQL statement and executes it once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filters: Vec<FieldFilter>,
    pub sort: Vec<SortKey>,
    /// `None` means all public columns (the internal version column stays out)
    pub fields: Option<Vec<String>>,
    pub skip: u64,
    pub limit: u64,
}

impl QuerySpec {
    /// Prepend an equality criterion scoping the listing to a parent record,
    /// e.g. reviews under one tour.
    pub fn scoped(mut self, column: &str, id: Uuid) -> Self {
        self.filters.insert(
            0,
            FieldFilter {
                field: column.to_string(),
                op: Comparison::Eq,
                value: FilterValue::Text(id.to_string()),
            },
        );
        self
    }
}

/// Builder translating raw query parameters into a [`QuerySpec`].
///
/// Each step consumes the builder and returns a new one, so a spec is
/// assembled as a chain; the conventional order is
/// `filter` → `sort` → `limit_fields` → `paginate`. Field names are checked
/// against the resource's column whitelist before they can reach SQL.
#[derive(Debug)]
pub struct QueryFeatures<'a> {
    params: &'a BTreeMap<String, String>,
    columns: &'static [&'static str],
    spec: QuerySpec,
}

impl<'a> QueryFeatures<'a> {
    pub fn new(params: &'a BTreeMap<String, String>, columns: &'static [&'static str]) -> Self {
        Self {
            params,
            columns,
            spec: QuerySpec::default(),
        }
    }

    fn check_field(&self, field: &str) -> Result<(), QueryError> {
        if self.columns.contains(&field) {
            Ok(())
        } else {
            Err(QueryError::UnknownField(field.to_string()))
        }
    }

    /// Translate every non-reserved key into a typed comparison criterion.
    /// `price[gte]=500` becomes `price >= 500`; a bare key means equality.
    pub fn filter(mut self) -> Result<Self, QueryError> {
        for (key, raw) in self.params {
            if CONTROL_PARAMS.contains(&key.as_str()) {
                continue;
            }

            let (field, op) = match key.split_once('[') {
                Some((field, rest)) => {
                    let suffix = rest
                        .strip_suffix(']')
                        .ok_or_else(|| QueryError::UnknownOperator(key.clone()))?;
                    let op = Comparison::from_suffix(suffix)
                        .ok_or_else(|| QueryError::UnknownOperator(suffix.to_string()))?;
                    (field, op)
                }
                None => (key.as_str(), Comparison::Eq),
            };

            self.check_field(field)?;
            self.spec.filters.push(FieldFilter {
                field: field.to_string(),
                op,
                value: FilterValue::parse(raw),
            });
        }
        Ok(self)
    }

    /// Parse the `sort` parameter: comma-separated fields, `-` prefix for
    /// descending. Absent means newest records first.
    pub fn sort(mut self) -> Result<Self, QueryError> {
        match self.params.get("sort") {
            Some(raw) => {
                for part in raw.split(',').filter(|p| !p.is_empty()) {
                    let (field, direction) = match part.strip_prefix('-') {
                        Some(field) => (field, Direction::Desc),
                        None => (part, Direction::Asc),
                    };
                    self.check_field(field)?;
                    self.spec.sort.push(SortKey {
                        field: field.to_string(),
                        direction,
                    });
                }
            }
            None => {
                self.spec.sort.push(SortKey {
                    field: CREATED_AT_COLUMN.to_string(),
                    direction: Direction::Desc,
                });
            }
        }
        Ok(self)
    }

    /// Parse the `fields` projection list. The id column is always included;
    /// without the parameter all public columns are returned, which leaves
    /// out only the store's internal version column.
    pub fn limit_fields(mut self) -> Result<Self, QueryError> {
        if let Some(raw) = self.params.get("fields") {
            let mut fields = Vec::new();
            for part in raw.split(',').filter(|p| !p.is_empty()) {
                if part != ID_COLUMN {
                    self.check_field(part)?;
                }
                if !fields.iter().any(|f| f == part) {
                    fields.push(part.to_string());
                }
            }
            if !fields.iter().any(|f| f == ID_COLUMN) {
                fields.insert(0, ID_COLUMN.to_string());
            }
            self.spec.fields = Some(fields);
        }
        Ok(self)
    }

    /// Compute skip/limit from `page` and `limit`. A page past the end of the
    /// collection yields an empty result set, not an error.
    pub fn paginate(mut self, limits: &PageLimits) -> Result<Self, QueryError> {
        let page = match self.params.get("page") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| QueryError::InvalidNumber("page"))?
                .max(1),
            None => 1,
        };
        let limit = match self.params.get("limit") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| QueryError::InvalidNumber("limit"))?
                .clamp(1, limits.max_limit),
            None => limits.default_limit,
        };

        // Saturate so an absurd page cannot overflow; the skip also stays
        // within SQLite's signed 64-bit OFFSET range.
        self.spec.skip = page
            .saturating_sub(1)
            .saturating_mul(limit)
            .min(i64::MAX as u64);
        self.spec.limit = limit;
        Ok(self)
    }

    pub fn into_spec(self) -> QuerySpec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "name", "price", "duration", "created_at"];

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn build(pairs: &[(&str, &str)]) -> Result<QuerySpec, QueryError> {
        let params = params(pairs);
        let limits = PageLimits::default();
        Ok(QueryFeatures::new(&params, COLUMNS)
            .filter()?
            .sort()?
            .limit_fields()?
            .paginate(&limits)?
            .into_spec())
    }

    #[test]
    fn test_control_keys_leave_query_unfiltered() {
        let spec = build(&[("page", "2"), ("sort", "name"), ("limit", "10"), ("fields", "name")])
            .unwrap();
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn test_gte_suffix_translates_to_comparison() {
        let spec = build(&[("price", "500"), ("duration[gte]", "5")]).unwrap();
        assert_eq!(spec.filters.len(), 2);

        let duration = spec.filters.iter().find(|f| f.field == "duration").unwrap();
        assert_eq!(duration.op, Comparison::Gte);
        assert_eq!(duration.value, FilterValue::Number(5.0));

        let price = spec.filters.iter().find(|f| f.field == "price").unwrap();
        assert_eq!(price.op, Comparison::Eq);
    }

    #[test]
    fn test_all_comparison_suffixes() {
        for (suffix, op) in [
            ("gte", Comparison::Gte),
            ("gt", Comparison::Gt),
            ("lte", Comparison::Lte),
            ("lt", Comparison::Lt),
        ] {
            let key = format!("price[{}]", suffix);
            let spec = build(&[(key.as_str(), "100")]).unwrap();
            assert_eq!(spec.filters[0].op, op);
        }
    }

    #[test]
    fn test_unknown_filter_field_rejected() {
        let err = build(&[("bogus", "1")]).unwrap_err();
        assert_eq!(err, QueryError::UnknownField("bogus".to_string()));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = build(&[("price[like]", "1")]).unwrap_err();
        assert_eq!(err, QueryError::UnknownOperator("like".to_string()));
    }

    #[test]
    fn test_sort_mixed_directions() {
        let spec = build(&[("sort", "-price,name")]).unwrap();
        assert_eq!(
            spec.sort,
            vec![
                SortKey {
                    field: "price".to_string(),
                    direction: Direction::Desc,
                },
                SortKey {
                    field: "name".to_string(),
                    direction: Direction::Asc,
                },
            ]
        );
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let spec = build(&[]).unwrap();
        assert_eq!(
            spec.sort,
            vec![SortKey {
                field: "created_at".to_string(),
                direction: Direction::Desc,
            }]
        );
    }

    #[test]
    fn test_fields_projection_always_includes_id() {
        let spec = build(&[("fields", "name,price")]).unwrap();
        assert_eq!(
            spec.fields,
            Some(vec![
                "id".to_string(),
                "name".to_string(),
                "price".to_string()
            ])
        );
    }

    #[test]
    fn test_absent_fields_means_all_public_columns() {
        let spec = build(&[]).unwrap();
        assert_eq!(spec.fields, None);
    }

    #[test]
    fn test_paginate_defaults() {
        let spec = build(&[]).unwrap();
        assert_eq!(spec.skip, 0);
        assert_eq!(spec.limit, 100);
    }

    #[test]
    fn test_paginate_skip_computation() {
        let spec = build(&[("page", "2"), ("limit", "10")]).unwrap();
        assert_eq!(spec.skip, 10);
        assert_eq!(spec.limit, 10);

        let spec = build(&[("page", "1000"), ("limit", "10")]).unwrap();
        assert_eq!(spec.skip, 9990);
    }

    #[test]
    fn test_paginate_huge_page_saturates() {
        let spec = build(&[("page", "18446744073709551615"), ("limit", "10")]).unwrap();
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.skip, i64::MAX as u64);
    }

    #[test]
    fn test_paginate_caps_limit() {
        let spec = build(&[("limit", "100000")]).unwrap();
        assert_eq!(spec.limit, 1000);
    }

    #[test]
    fn test_paginate_rejects_garbage() {
        let err = build(&[("page", "abc")]).unwrap_err();
        assert_eq!(err, QueryError::InvalidNumber("page"));
    }

    #[test]
    fn test_scoped_prepends_equality_filter() {
        let id = Uuid::new_v4();
        let spec = build(&[("price[gte]", "100")]).unwrap().scoped("id", id);
        assert_eq!(spec.filters[0].field, "id");
        assert_eq!(spec.filters[0].op, Comparison::Eq);
        assert_eq!(spec.filters[0].value, FilterValue::Text(id.to_string()));
    }
}

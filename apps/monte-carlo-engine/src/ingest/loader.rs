//! Trade outcome file loading.
//!
//! Two formats are accepted:
//!
//! - `.json`: a bare array of numbers, or an object
//!   `{ "initialBalance": 10000.0, "outcomes": [...] }`
//! - anything else: delimited text, one trade per row. Blank lines and `#`
//!   comments are skipped, and a `balance=<value>` line sets the initial
//!   balance. A single leading header row is allowed. When it names a
//!   `Profit` column, outcomes are read from that column; otherwise the last
//!   comma/semicolon/tab separated field of each row is the outcome.
//!
//! Trade history reports exported from MetaTrader 5 are read from their
//! `Deals` section. Everything above the `Deals` banner is ignored, the first
//! `balance` deal gives the initial balance, and only closing deals (`out`,
//! `in/out`, `out by`) contribute their profit.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Outcome file loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file.
    #[error("Failed to read outcome file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Malformed JSON document.
    #[error("Failed to parse outcome JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed delimited row.
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// The file held no outcomes.
    #[error("No trade data available")]
    Empty,
}

/// Outcomes read from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedOutcomes {
    /// Trade profit/loss values in file order.
    pub outcomes: Vec<f64>,
    /// Initial balance, when the file carries one.
    pub initial_balance: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonOutcomes {
    Plain(Vec<f64>),
    #[serde(rename_all = "camelCase")]
    Document {
        #[serde(default)]
        initial_balance: Option<f64>,
        outcomes: Vec<f64>,
    },
}

/// Load outcomes from `path`, choosing the format by extension.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be read, is malformed, or holds
/// no outcomes.
pub fn load_outcomes(path: impl AsRef<Path>) -> Result<LoadedOutcomes, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let loaded = if is_json {
        parse_json(&contents)?
    } else {
        parse_delimited(&contents)?
    };

    debug!(
        path = %path.display(),
        trades = loaded.outcomes.len(),
        initial_balance = ?loaded.initial_balance,
        "Loaded trade outcomes"
    );

    Ok(loaded)
}

/// Parse a JSON outcome document.
///
/// # Errors
///
/// Returns `LoadError::Json` for malformed input and `LoadError::Empty` when
/// there are no outcomes.
pub fn parse_json(contents: &str) -> Result<LoadedOutcomes, LoadError> {
    let loaded = match serde_json::from_str::<JsonOutcomes>(contents)? {
        JsonOutcomes::Plain(outcomes) => LoadedOutcomes {
            outcomes,
            initial_balance: None,
        },
        JsonOutcomes::Document {
            initial_balance,
            outcomes,
        } => LoadedOutcomes {
            outcomes,
            initial_balance,
        },
    };

    if loaded.outcomes.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(loaded)
}

/// Parse delimited text, one outcome per row.
///
/// # Errors
///
/// Returns `LoadError::Parse` with the offending line number, or
/// `LoadError::Empty` when no rows remain.
pub fn parse_delimited(contents: &str) -> Result<LoadedOutcomes, LoadError> {
    let mut outcomes = Vec::new();
    let mut initial_balance = None;
    let mut layout = None;
    let mut in_section = !contents.lines().any(is_deals_banner);

    for (index, raw) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(value) = balance_directive(line) {
            initial_balance = Some(parse_number(value, line_number)?);
            continue;
        }

        if !in_section {
            in_section = is_deals_banner(line);
            continue;
        }

        // Split the untrimmed row so leading empty cells keep their columns.
        let fields: Vec<&str> = raw.split(DELIMITERS).map(str::trim).collect();

        let current = match layout {
            Some(current) => current,
            None => {
                let detected = Layout::detect(&fields, line_number);
                layout = Some(detected);
                if detected.consumes_first_row() {
                    continue;
                }
                detected
            }
        };

        match current.read(&fields, line_number)? {
            Row::Outcome(outcome) => outcomes.push(outcome),
            Row::Balance(balance) if initial_balance.is_none() => {
                initial_balance = Some(balance);
            }
            Row::Balance(_) => debug!(line = line_number, "Skipping later balance operation"),
            Row::Skip => {}
        }
    }

    if outcomes.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(LoadedOutcomes {
        outcomes,
        initial_balance,
    })
}

const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// How rows of a delimited file map to outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// The last field is the outcome. `header` marks a skipped header row.
    LastField { header: bool },
    /// Fields are picked by the header's column names.
    Columns(Columns),
}

/// Column positions named by a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    profit: usize,
    balance: Option<usize>,
    kind: Option<usize>,
    direction: Option<usize>,
}

/// What a single data row contributes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Row {
    Outcome(f64),
    Balance(f64),
    Skip,
}

impl Layout {
    /// Choose a layout from the first data row.
    fn detect(fields: &[&str], line: usize) -> Self {
        if let Some(columns) = Columns::from_header(fields) {
            debug!(line, ?columns, "Reading outcomes by column name");
            return Self::Columns(columns);
        }

        let header = parse_number(last_field(fields), line).is_err();
        if header {
            debug!(line, "Skipping header row");
        }
        Self::LastField { header }
    }

    const fn consumes_first_row(self) -> bool {
        match self {
            Self::LastField { header } => header,
            Self::Columns(_) => true,
        }
    }

    fn read(self, fields: &[&str], line: usize) -> Result<Row, LoadError> {
        match self {
            Self::LastField { .. } => parse_number(last_field(fields), line).map(Row::Outcome),
            Self::Columns(columns) => columns.read(fields, line),
        }
    }
}

impl Columns {
    /// Column positions, when the header names a `Profit` column.
    fn from_header(fields: &[&str]) -> Option<Self> {
        let find = |name: &str| fields.iter().position(|f| f.eq_ignore_ascii_case(name));

        Some(Self {
            profit: find("profit")?,
            balance: find("balance"),
            kind: find("type"),
            direction: find("direction"),
        })
    }

    fn read(self, fields: &[&str], line: usize) -> Result<Row, LoadError> {
        let field = |index: usize| fields.get(index).copied().unwrap_or_default();

        if let Some(kind) = self.kind
            && field(kind).eq_ignore_ascii_case("balance")
        {
            let column = self.balance.unwrap_or(self.profit);
            return parse_amount(field(column), line).map(Row::Balance);
        }

        if let Some(direction) = self.direction
            && !is_closing_deal(field(direction))
        {
            return Ok(Row::Skip);
        }

        parse_amount(field(self.profit), line).map(Row::Outcome)
    }
}

fn last_field<'a>(fields: &[&'a str]) -> &'a str {
    fields.last().copied().unwrap_or_default()
}

/// A `Deals` banner row, optionally padded with empty cells.
fn is_deals_banner(line: &str) -> bool {
    let mut fields = line.split(DELIMITERS).map(str::trim);
    fields
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case("deals"))
        && fields.all(str::is_empty)
}

/// Deal directions that realise a profit.
fn is_closing_deal(direction: &str) -> bool {
    ["out", "in/out", "out by"]
        .iter()
        .any(|closing| direction.eq_ignore_ascii_case(closing))
}

/// Report amounts may group thousands with spaces.
fn parse_amount(field: &str, line: usize) -> Result<f64, LoadError> {
    let compact: String = field.chars().filter(|c| !c.is_whitespace()).collect();
    parse_number(&compact, line)
}

/// Value of a `balance=<value>` line, matched case-insensitively.
fn balance_directive(line: &str) -> Option<&str> {
    let (key, value) = line.split_once('=')?;
    key.trim()
        .eq_ignore_ascii_case("balance")
        .then_some(value.trim())
}

fn parse_number(field: &str, line: usize) -> Result<f64, LoadError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LoadError::Parse {
            line,
            message: format!("'{field}' is not a finite number"),
        }),
    }
}

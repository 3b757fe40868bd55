//! Turns tabular input into [`Directive`]s.
//!
//! Structurally invalid input is fatal; an individual bad row is rejected
//! with a message and the rest of the input still loads.

use crate::error::{Result, UsersyncError};
use crate::types::{Action, Directive, Member};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "action",
    "account_name",
    "first_name",
    "last_name",
    "email",
    "roles",
    "install_names",
];

const ACTION: usize = 0;
const ACCOUNT_NAME: usize = 1;
const FIRST_NAME: usize = 2;
const LAST_NAME: usize = 3;
const EMAIL: usize = 4;
const ROLES: usize = 5;
const INSTALL_NAMES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line of the offending record.
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub directives: Vec<Directive>,
    pub rejected: Vec<RowError>,
    /// True when the first record was data rather than a header row.
    pub headerless: bool,
}

/// Position of each required column within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns([usize; REQUIRED_COLUMNS.len()]);

impl Columns {
    const POSITIONAL: Columns = Columns([0, 1, 2, 3, 4, 5, 6]);

    fn from_header(record: &StringRecord) -> Option<Self> {
        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = record.iter().position(|h| h == name)?;
        }
        Some(Columns(idx))
    }
}

pub fn load_path(path: &Path) -> Result<LoadReport> {
    let file = std::fs::File::open(path)?;
    load_reader(file)
}

pub fn load_reader<R: Read>(input: R) -> Result<LoadReport> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);
    let mut records = reader.records();

    let first = match records.next() {
        Some(r) => r?,
        None => return Err(UsersyncError::EmptyInput),
    };

    let mut report = LoadReport::default();
    let columns = match Columns::from_header(&first) {
        Some(c) => c,
        None if looks_like_data(&first) => {
            report.headerless = true;
            report.accept(Columns::POSITIONAL, &first, 1);
            Columns::POSITIONAL
        }
        None => {
            return Err(UsersyncError::InvalidStructure(REQUIRED_COLUMNS.join(", ")))
        }
    };

    for (i, record) in records.enumerate() {
        let line = i as u64 + 2;
        match record {
            Ok(r) => report.accept(columns, &r, line),
            Err(e) => report.rejected.push(RowError {
                line,
                message: format!("Failed to parse CSV row: {e}"),
            }),
        }
    }

    if report.directives.is_empty() {
        return Err(UsersyncError::EmptyInput);
    }
    tracing::debug!(
        accepted = report.directives.len(),
        rejected = report.rejected.len(),
        headerless = report.headerless,
        "loaded input"
    );
    Ok(report)
}

/// A header-less first row is recognised by carrying an email address.
fn looks_like_data(record: &StringRecord) -> bool {
    record.len() >= REQUIRED_COLUMNS.len() && record.iter().any(|f| f.contains('@'))
}

impl LoadReport {
    fn accept(&mut self, columns: Columns, record: &StringRecord, line: u64) {
        match parse_row(columns, record) {
            Ok(d) => self.directives.push(d),
            Err(message) => self.rejected.push(RowError { line, message }),
        }
    }
}

fn column_value(
    columns: Columns,
    record: &StringRecord,
    col: usize,
) -> std::result::Result<&str, String> {
    record.get(columns.0[col]).ok_or_else(|| {
        format!(
            "Missing column '{}': row has {} fields",
            REQUIRED_COLUMNS[col],
            record.len()
        )
    })
}

fn parse_row(columns: Columns, record: &StringRecord) -> std::result::Result<Directive, String> {
    let field = |col: usize| column_value(columns, record, col);

    let email = field(EMAIL)?;
    let raw_action = field(ACTION)?;
    let action: Action = raw_action.parse().map_err(|_| {
        format!(
            "Invalid action '{}' for user {email}. Must be 'add' or 'remove'",
            raw_action.to_ascii_lowercase()
        )
    })?;
    if !email.contains('@') {
        return Err(format!("Invalid email format for user: {email}"));
    }

    let member = Member {
        account_name: field(ACCOUNT_NAME)?.to_string(),
        first_name: field(FIRST_NAME)?.to_string(),
        last_name: field(LAST_NAME)?.to_string(),
        email: email.to_string(),
        roles: split_list(field(ROLES)?)
            .filter(|r| !r.is_empty())
            .collect(),
    };
    let install_names = split_list(field(INSTALL_NAMES)?).collect();

    Ok(match action {
        Action::Add => Directive::Add {
            member,
            install_names,
        },
        Action::Remove => Directive::Remove { member },
    })
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "action,account_name,first_name,last_name,email,roles,install_names\n";

    fn load(body: &str) -> Result<LoadReport> {
        load_reader(body.as_bytes())
    }

    #[test]
    fn loads_rows_by_header_name() {
        let csv = "email,action,account_name,first_name,last_name,roles,install_names,notes\n\
                   bob@x.com,add,Acme,Bob,Smith,\"full,billing\",\"site1,site2\",hi\n";
        let report = load(csv).unwrap();
        assert!(!report.headerless);
        assert_eq!(report.directives.len(), 1);
        match &report.directives[0] {
            Directive::Add {
                member,
                install_names,
            } => {
                assert_eq!(member.email, "bob@x.com");
                assert_eq!(member.account_name, "Acme");
                assert_eq!(member.roles, vec!["full", "billing"]);
                assert_eq!(install_names, &vec!["site1", "site2"]);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn headerless_input_is_positional() {
        let csv = "add,Acme,Bob,Smith,bob@x.com,full,site1\n\
                   remove,Acme,Carol,Jones,carol@x.com,full,\n";
        let report = load(csv).unwrap();
        assert!(report.headerless);
        assert_eq!(report.directives.len(), 2);
        assert_eq!(report.directives[1].action(), Action::Remove);
        assert_eq!(report.directives[1].member().email, "carol@x.com");
    }

    #[test]
    fn unrecognised_header_is_fatal() {
        let csv = "who,what\nbob,add\n";
        assert!(matches!(load(csv), Err(UsersyncError::InvalidStructure(_))));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(matches!(load(""), Err(UsersyncError::EmptyInput)));
        assert!(matches!(load(HEADER), Err(UsersyncError::EmptyInput)));
    }

    #[test]
    fn action_is_case_insensitive_and_trimmed() {
        let csv = format!("{HEADER} ADD ,Acme,Bob,Smith,bob@x.com,full,site1\n");
        let report = load(&csv).unwrap();
        assert_eq!(report.directives[0].action(), Action::Add);
    }

    #[test]
    fn invalid_action_rejects_only_that_row() {
        let csv = format!(
            "{HEADER}promote,Acme,Bob,Smith,bob@x.com,full,site1\n\
             add,Acme,Dan,Brown,dan@x.com,full,site1\n"
        );
        let report = load(&csv).unwrap();
        assert_eq!(report.directives.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 2);
        assert_eq!(
            report.rejected[0].message,
            "Invalid action 'promote' for user bob@x.com. Must be 'add' or 'remove'"
        );
    }

    #[test]
    fn malformed_email_row_is_dropped() {
        let csv = format!(
            "{HEADER}add,Acme,Bob,Smith,bob@x.com,full,site1\n\
             add,Acme,Eve,Evil,not-an-email,full,site1\n\
             remove,Acme,Carol,Jones,carol@x.com,full,\n"
        );
        let report = load(&csv).unwrap();
        assert_eq!(report.directives.len(), 2);
        assert_eq!(
            report.rejected[0].message,
            "Invalid email format for user: not-an-email"
        );
    }

    #[test]
    fn short_row_is_rejected() {
        let csv = format!(
            "{HEADER}add,Acme,Bob\n\
             add,Acme,Dan,Brown,dan@x.com,full,site1\n"
        );
        let report = load(&csv).unwrap();
        assert_eq!(report.directives.len(), 1);
        assert!(report.rejected[0].message.starts_with("Missing column"));
    }

    #[test]
    fn whitespace_around_email_is_trimmed() {
        let csv = format!(
            "{HEADER}add,Acme,Bob,Smith,  bob@x.com  ,full,site1\n\
             add, Acme ,Bob,Smith,bob@x.com\t,full,site1\n"
        );
        let report = load(&csv).unwrap();
        let a = report.directives[0].member();
        let b = report.directives[1].member();
        assert_eq!(a.email, "bob@x.com");
        assert_eq!((&a.account_name, &a.email), (&b.account_name, &b.email));
    }

    #[test]
    fn roles_keep_order_and_duplicates_but_drop_blanks() {
        let csv = format!("{HEADER}add,Acme,Bob,Smith,bob@x.com,\"full, billing,,full\",\n");
        let report = load(&csv).unwrap();
        assert_eq!(
            report.directives[0].member().roles,
            vec!["full", "billing", "full"]
        );
    }
}

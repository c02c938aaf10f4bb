//! Bulk loading of users from a CSV export with `email,name,role` columns.

use crate::error::GatewayError;
use crate::gateway::DirectoryGateway;
use crate::models::NewUser;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed user on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("user on line {line} needs both an email and a name")]
    MissingField { line: usize },

    #[error("{email} appears more than once (again on line {line})")]
    DuplicateEmail { line: usize, email: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: Vec<String>,
    /// Emails that were already registered and were left untouched.
    pub skipped: Vec<String>,
}

/// Parses and checks every row of a user CSV. Any bad row fails the whole read.
pub fn read_users<R: Read>(reader: R) -> Result<Vec<NewUser>, ImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut users = Vec::new();

    for (i, row) in csv.deserialize::<NewUser>().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let user = row.map_err(|source| ImportError::Malformed { line, source })?;

        if user.email.is_empty() || user.name.is_empty() {
            return Err(ImportError::MissingField { line });
        }
        if !seen.insert(user.email.clone()) {
            return Err(ImportError::DuplicateEmail {
                line,
                email: user.email,
            });
        }

        users.push(user);
    }

    Ok(users)
}

/// Adds every user in the CSV whose email is not registered yet.
///
/// The whole file is read and checked before anything is written, so a bad row leaves the store
/// untouched.
pub fn import_users<G, R>(gateway: &mut G, reader: R) -> Result<ImportReport, ImportError>
where
    G: DirectoryGateway + ?Sized,
    R: Read,
{
    let users = read_users(reader)?;
    let mut report = ImportReport::default();

    for user in users {
        if gateway.find_user_by_email(&user.email)?.is_some() {
            tracing::info!(email = %user.email, "already registered, skipping");
            report.skipped.push(user.email);
            continue;
        }

        gateway.insert_user(&user)?;
        report.added.push(user.email);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn reads_trimmed_rows() {
        let data = "email,name,role\n ferris@school.test , Ferris The Crab , student\nt@school.test,Ms T,teacher\n";

        let users = read_users(data.as_bytes()).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "ferris@school.test");
        assert_eq!(users[0].name, "Ferris The Crab");
        assert_eq!(users[0].role, Role::Student);
        assert_eq!(users[1].role, Role::Teacher);
    }

    #[test]
    fn unknown_roles_fail_the_read() {
        let data = "email,name,role\np@school.test,Principal,principal\n";
        let err = read_users(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Malformed { line: 2, .. }));
    }

    #[test]
    fn empty_names_are_caught_on_their_line() {
        let data = "email,name,role\nok@school.test,Ok,student\nnameless@school.test,,student\n";
        let err = read_users(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { line: 3 }));
    }

    #[test]
    fn repeated_emails_are_rejected() {
        let data = "email,name,role\na@school.test,A,student\na@school.test,A again,teacher\n";
        let err = read_users(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateEmail { line: 3, .. }));
    }
}

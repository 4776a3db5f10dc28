//! Last-known-good publication of compile results
//!
//! An editor recompiles on every change. A [`Session`] keeps the most recent
//! successful table so consumers keep rendering while the document is
//! temporarily broken, and drops results that arrive for superseded
//! revisions.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::document::Node;
use crate::error::CompileError;
use crate::resolve::FlatTable;
use crate::Compiler;

/// Monotonic document revision tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Outcome of offering a table to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    /// The table is now current
    Published(Arc<FlatTable>),
    /// A newer revision is already published; the table was dropped
    Discarded { current: Revision },
}

impl Publication {
    pub fn is_published(&self) -> bool {
        matches!(self, Publication::Published(_))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    compiler: Compiler,
    published: Option<(Revision, Arc<FlatTable>)>,
}

impl Session {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            published: None,
        }
    }

    /// Compile `document` and publish the result under `revision`.
    ///
    /// On error the previously published table stays current.
    pub fn submit(&mut self, revision: Revision, document: &Node) -> Result<Publication, CompileError> {
        match self.compiler.compile(document) {
            Ok(table) => Ok(self.publish(revision, table)),
            Err(err) => {
                warn!(
                    revision = revision.0,
                    kept:? = self.revision();
                    "Compile failed, keeping last good table"
                );
                Err(err)
            }
        }
    }

    /// Compile without touching the published table
    pub fn compile(&self, document: &Node) -> Result<FlatTable, CompileError> {
        self.compiler.compile(document)
    }

    /// Publish a table compiled elsewhere (for example on a worker thread).
    ///
    /// Revisions at or below the current one are discarded.
    pub fn publish(&mut self, revision: Revision, table: FlatTable) -> Publication {
        if let Some((current, _)) = &self.published {
            if revision <= *current {
                debug!(revision = revision.0, current = current.0; "Discarding stale table");
                return Publication::Discarded { current: *current };
            }
        }

        let table = Arc::new(table);
        debug!(revision = revision.0, entries = table.len(); "Published table");
        self.published = Some((revision, Arc::clone(&table)));
        Publication::Published(table)
    }

    /// Current table, if any pass has succeeded
    pub fn current(&self) -> Option<Arc<FlatTable>> {
        self.published.as_ref().map(|(_, table)| Arc::clone(table))
    }

    pub fn revision(&self) -> Option<Revision> {
        self.published.as_ref().map(|(revision, _)| *revision)
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_toml;
    use crate::ErrorKind;

    fn doc(source: &str) -> Node {
        parse_toml(source).unwrap()
    }

    #[test]
    fn test_first_success_publishes() {
        let mut session = Session::default();
        assert!(session.current().is_none());

        let publication = session.submit(Revision(1), &doc("[vars]\nm = 4")).unwrap();
        assert!(publication.is_published());
        assert_eq!(session.revision(), Some(Revision(1)));
        assert_eq!(session.current().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_failure_keeps_last_good_table() {
        let mut session = Session::default();
        session.submit(Revision(1), &doc("[vars]\nm = 4")).unwrap();

        let err = session
            .submit(Revision(2), &doc("[vars]\nm = \"missing + 1\""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        assert_eq!(session.revision(), Some(Revision(1)));
        assert!(session.current().unwrap().lookup("m").is_some());
    }

    #[test]
    fn test_stale_revision_is_discarded() {
        let mut session = Session::default();
        session.submit(Revision(5), &doc("[vars]\na = 1")).unwrap();

        let publication = session.submit(Revision(3), &doc("[vars]\nb = 2")).unwrap();
        assert_eq!(publication, Publication::Discarded { current: Revision(5) });
        assert!(session.current().unwrap().lookup("a").is_some());

        let publication = session.submit(Revision(5), &doc("[vars]\nb = 2")).unwrap();
        assert!(!publication.is_published());
    }

    #[test]
    fn test_published_tables_are_shared_not_mutated() {
        let mut session = Session::default();
        session.submit(Revision(1), &doc("[vars]\na = 1")).unwrap();
        let held = session.current().unwrap();

        session.submit(Revision(2), &doc("[vars]\nb = 2")).unwrap();
        assert!(held.lookup("a").is_some());
        assert!(held.lookup("b").is_none());
        assert!(session.current().unwrap().lookup("b").is_some());
    }

    #[test]
    fn test_publish_precompiled_table() {
        let mut session = Session::default();
        let table = session.compile(&doc("[vars]\na = 1")).unwrap();
        assert!(session.publish(Revision(1).next(), table).is_published());
        assert_eq!(session.revision(), Some(Revision(2)));
    }
}

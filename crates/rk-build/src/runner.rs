//! Script execution
//!
//! `ScriptRunner` walks a build script depth-first: statements run in
//! document order against a single connection, and a `.read` include runs to
//! completion before the line after it. Include paths resolve against the
//! directory of the file containing the directive, never the process cwd, so
//! nested includes keep working when the script tree is run from anywhere.

use crate::error::{BuildError, BuildResult};
use crate::script::{ScriptLine, StatementBuffer};
use futures::future::BoxFuture;
use futures::FutureExt;
use rk_db::Database;
use std::path::{Path, PathBuf};

/// Counters from one script run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Script files executed, includes counted
    pub files: usize,
    /// Statements sent to the database
    pub statements: usize,
}

/// Depth-first executor for one build-script tree
pub struct ScriptRunner<'a> {
    db: &'a dyn Database,
    /// Canonical paths of the files currently executing, outermost first.
    /// Revisiting one of these means the includes form a cycle.
    visiting: Vec<PathBuf>,
    stats: RunStats,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self {
            db,
            visiting: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Run a script and its transitive includes, consuming the runner.
    ///
    /// The first failing statement or unresolvable include aborts the whole
    /// run; nothing executed so far is rolled back.
    pub async fn run(mut self, script: &Path) -> BuildResult<RunStats> {
        if !script.exists() {
            return Err(BuildError::ScriptNotFound {
                path: script.display().to_string(),
            });
        }
        self.run_file(script.to_path_buf()).await?;
        Ok(self.stats)
    }

    // Recursion goes through a boxed future; an async fn cannot await itself
    // directly.
    fn run_file(&mut self, path: PathBuf) -> BoxFuture<'_, BuildResult<()>> {
        async move {
            let canonical = path.canonicalize().map_err(|e| BuildError::Io {
                path: path.display().to_string(),
                source: e,
            })?;

            if self.visiting.contains(&canonical) {
                let mut chain: Vec<String> = self
                    .visiting
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                chain.push(canonical.display().to_string());
                return Err(BuildError::CyclicInclude {
                    chain: chain.join(" -> "),
                });
            }

            let content = std::fs::read_to_string(&canonical).map_err(|e| BuildError::Io {
                path: canonical.display().to_string(),
                source: e,
            })?;
            let base_dir = canonical
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));

            log::debug!("running script file: {}", canonical.display());
            self.visiting.push(canonical.clone());
            self.stats.files += 1;

            let mut buffer = StatementBuffer::new();
            for raw_line in content.lines() {
                match ScriptLine::classify(raw_line) {
                    ScriptLine::Blank | ScriptLine::Comment => {}
                    ScriptLine::Include(rel) => {
                        // flush any pending SQL before reading another file
                        if let Some(pending) = buffer.flush() {
                            self.execute(&pending).await?;
                        }
                        let include_path = base_dir.join(rel);
                        if !include_path.exists() {
                            return Err(BuildError::IncludeNotFound {
                                path: include_path.display().to_string(),
                                from: canonical.display().to_string(),
                            });
                        }
                        self.run_file(include_path).await?;
                    }
                    ScriptLine::Sql(raw) => {
                        for statement in buffer.push_line(raw) {
                            self.execute(&statement).await?;
                        }
                    }
                }
            }

            if let Some(pending) = buffer.flush() {
                self.execute(&pending).await?;
            }

            self.visiting.pop();
            Ok(())
        }
        .boxed()
    }

    async fn execute(&mut self, sql: &str) -> BuildResult<()> {
        self.db.execute(sql).await?;
        self.stats.statements += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;

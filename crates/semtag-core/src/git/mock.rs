//! Scripted [`Git`] implementation for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use camino::{Utf8Path, Utf8PathBuf};

use super::{Git, GitOutput, GitResult};

/// Replies to git invocations from a script instead of running git.
///
/// Each rule matches the exact argument list. A rule with several queued
/// replies hands them out in order and keeps repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedGit {
    rules: RefCell<Vec<(Vec<String>, VecDeque<GitOutput>)>>,
    calls: RefCell<Vec<Call>>,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub dir: Option<Utf8PathBuf>,
    pub args: Vec<String>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` when git is called with exactly `args`.
    pub fn on(self, args: &[&str], reply: GitOutput) -> Self {
        {
            let mut rules = self.rules.borrow_mut();
            let key: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
            if let Some((_, replies)) = rules.iter_mut().find(|(k, _)| *k == key) {
                replies.push_back(reply);
            } else {
                rules.push((key, VecDeque::from([reply])));
            }
        }
        self
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Just the argument lists, joined with spaces.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.args.join(" "))
            .collect()
    }

    /// Whether a call with exactly `args` happened.
    pub fn called(&self, args: &[&str]) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.args.iter().map(String::as_str).eq(args.iter().copied()))
    }
}

impl Git for ScriptedGit {
    fn run(&self, dir: Option<&Utf8Path>, args: &[&str]) -> GitResult<GitOutput> {
        let key: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        self.calls.borrow_mut().push(Call {
            dir: dir.map(Utf8Path::to_path_buf),
            args: key.clone(),
        });

        let mut rules = self.rules.borrow_mut();
        let Some((_, replies)) = rules.iter_mut().find(|(k, _)| *k == key) else {
            panic!("unscripted git call: git {}", key.join(" "));
        };
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        Ok(reply.unwrap_or_else(|| GitOutput::ok("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_in_order_then_repeats_last() {
        let git = ScriptedGit::new()
            .on(&["ls-remote", "origin", "HEAD"], GitOutput::ok("first"))
            .on(&["ls-remote", "origin", "HEAD"], GitOutput::ok("second"));

        let args = ["ls-remote", "origin", "HEAD"];
        assert_eq!(git.run(None, &args).unwrap().output, "first");
        assert_eq!(git.run(None, &args).unwrap().output, "second");
        assert_eq!(git.run(None, &args).unwrap().output, "second");
        assert_eq!(git.calls().len(), 3);
        assert!(git.called(&args));
    }

    #[test]
    #[should_panic(expected = "unscripted git call")]
    fn unscripted_call_panics() {
        let _ = ScriptedGit::new().run(None, &["status"]);
    }
}

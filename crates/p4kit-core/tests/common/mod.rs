#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use p4kit_core::{CommandResult, CommandRunner, P4Error, P4};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// Replays canned results in order and records what was asked of it.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: RefCell<VecDeque<CommandResult>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, stdout: &str, stderr: &str, status: i32) -> Self {
        self.replies
            .borrow_mut()
            .push_back(CommandResult::new(stdout, stderr, status));
        self
    }

    pub fn ok(self, stdout: &str) -> Self {
        self.reply(stdout, "", 0)
    }

    pub fn fail(self, stderr: &str) -> Self {
        self.reply("", stderr, 1)
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn call_args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|call| call.args).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, P4Error> {
        self.calls.borrow_mut().push(Invocation {
            args: args.to_vec(),
            stdin: stdin.map(str::to_string),
        });
        let reply = self.replies.borrow_mut().pop_front();
        Ok(reply.unwrap_or_else(|| panic!("unexpected invocation: {:?}", args)))
    }
}

pub fn p4(runner: &ScriptedRunner) -> P4<&ScriptedRunner> {
    P4::with_runner("alice", "alice-main", runner)
}

pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

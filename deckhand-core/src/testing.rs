//! Fakes shared by the unit tests.

use crate::client::{Client, ClientError, PreparedRequest, Response, Transport};
use crate::command::{execute, Command, CommandError, Io};
use crate::guess::{AppGuesser, GuessError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;

pub const TARGET: &str = "http://paas.test";

/// Client pointed at [`TARGET`], without a token
pub fn client(transport: impl Transport + 'static) -> Client {
    Client::new(transport, TARGET)
}

/// Answers every request with the same response and records what it saw
pub struct StaticTransport {
    status: u16,
    body: String,
    requests: RefCell<Vec<PreparedRequest>>,
}

impl StaticTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for StaticTransport {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(Response::new(self.status, self.body.clone()))
    }
}

type Condition = Box<dyn Fn(&PreparedRequest) -> bool>;

/// Answers only requests matching a predicate; anything else is a
/// transport failure
pub struct ConditionalTransport {
    status: u16,
    body: String,
    condition: Condition,
    calls: Cell<usize>,
}

impl ConditionalTransport {
    pub fn new(
        status: u16,
        body: impl Into<String>,
        condition: impl Fn(&PreparedRequest) -> bool + 'static,
    ) -> Self {
        Self {
            status,
            body: body.into(),
            condition: Box::new(condition),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Transport for ConditionalTransport {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        self.calls.set(self.calls.get() + 1);
        if !(self.condition)(request) {
            return Err(ClientError::Transport(format!(
                "condition failed for {} {}",
                request.method, request.url
            )));
        }
        Ok(Response::new(self.status, self.body.clone()))
    }
}

/// Plays a sequence of conditional transports, one per request
pub struct SequenceTransport {
    steps: RefCell<VecDeque<ConditionalTransport>>,
}

impl SequenceTransport {
    pub fn new(steps: Vec<ConditionalTransport>) -> Self {
        Self {
            steps: RefCell::new(steps.into()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.borrow().len()
    }
}

impl Transport for SequenceTransport {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        let step = self.steps.borrow_mut().pop_front();
        match step {
            Some(step) => step.round_trip(request),
            None => Err(ClientError::Transport(format!(
                "unexpected request {} {}",
                request.method, request.url
            ))),
        }
    }
}

/// Fixed app name; an empty one fails to guess
pub struct FakeGuesser {
    name: String,
}

impl FakeGuesser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AppGuesser for FakeGuesser {
    fn guess_name(&self, _dir: &Path) -> Result<String, GuessError> {
        if self.name.is_empty() {
            return Err(GuessError::RepositoryNotFound);
        }
        Ok(self.name.clone())
    }
}

/// Result of one command run
pub struct Outcome {
    pub result: Result<(), CommandError>,
    pub stdout: String,
}

/// Run a command with the given arguments and stdin contents
pub fn run(command: &dyn Command, argv: &[&str], stdin: &str, client: &Client) -> Outcome {
    let argv: Vec<String> = argv.iter().map(|a| a.to_string()).collect();
    let mut input = stdin.as_bytes();
    let mut stdout = Vec::new();

    let result = execute(
        command,
        &argv,
        Io {
            stdin: &mut input,
            stdout: &mut stdout,
        },
        client,
    );

    Outcome {
        result,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
    }
}

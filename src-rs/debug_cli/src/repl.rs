use std::io;
use std::thread;
use std::time::Duration;

use crate::cli::pipe_args;
use crate::client::HTTPClient;
use crate::models::{CLIConfig, GeneralRequest, SubmitRequest};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('/') {
                render::info("commands start with '/', type /help");
                continue;
            }
            if self.handle_command(&line) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "submit" => self.submit(rest),
            "general" => self.general(rest),
            "poll" => self.with_task_id(rest, |repl, id| match repl.client.poll(id) {
                Ok(poll) => render::poll(&poll),
                Err(err) => render::error(&err),
            }),
            "wait" => self.with_task_id(rest, |repl, id| repl.wait(id)),
            "cancel" => self.with_task_id(rest, |repl, id| match repl.client.cancel(id) {
                Ok(true) => render::info("cancelled"),
                Ok(false) => render::info("not cancelled (unknown or already finished)"),
                Err(err) => render::error(&err),
            }),
            "credit" => match self.client.credit() {
                Ok(balance) => render::info(&format!("{} has {} credit left", self.config.principal, balance)),
                Err(err) => render::error(&err),
            },
            "principal" => {
                if rest.is_empty() {
                    render::info(&format!("principal: {}", self.config.principal));
                } else {
                    self.config.principal = rest.to_string();
                    self.reconnect("principal updated");
                }
            }
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.reconnect("base url updated");
                }
            }
            "config" => render::config(&self.config),
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn reconnect(&mut self, done: &str) {
        match HTTPClient::new(&self.config.base_url, &self.config.principal) {
            Ok(client) => {
                self.client = client;
                render::info(done);
            }
            Err(err) => render::error(&err),
        }
    }

    fn with_task_id(&mut self, rest: &str, action: impl FnOnce(&mut Self, &str)) {
        if rest.is_empty() {
            render::error("task id required");
        } else {
            action(self, rest);
        }
    }

    fn submit(&mut self, rest: &str) {
        let args = pipe_args(rest);
        if args.len() < 2 {
            render::error("usage: /submit <model> | <specExample> [| <productNameExample>]");
            return;
        }
        let req = SubmitRequest {
            model: args[0].clone(),
            spec_example: args[1].clone(),
            product_name_example: args.get(2).cloned(),
        };
        render::info("submitting, this may take up to a minute...");
        match self.client.submit(&req) {
            Ok(reply) => render::reply(&reply),
            Err(err) => render::error(&err),
        }
    }

    fn general(&mut self, rest: &str) {
        let args = pipe_args(rest);
        if args.len() != 2 {
            render::error("usage: /general <productName> | <specExample>");
            return;
        }
        let req = GeneralRequest {
            product_name: args[0].clone(),
            spec_example: args[1].clone(),
        };
        match self.client.general(&req) {
            Ok(reply) => render::reply(&reply),
            Err(err) => render::error(&err),
        }
    }

    fn wait(&self, task_id: &str) {
        let interval = Duration::from_secs(self.config.poll_interval.max(1));
        loop {
            match self.client.poll(task_id) {
                Ok(poll) if poll.is_terminal() => {
                    render::poll(&poll);
                    return;
                }
                Ok(_) => render::info("running..."),
                Err(err) => {
                    render::error(&err);
                    return;
                }
            }
            thread::sleep(interval);
        }
    }
}

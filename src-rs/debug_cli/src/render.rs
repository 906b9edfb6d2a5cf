use std::io::{self, Write};

use serde_json::Value;

use crate::models::{CLIConfig, SubmitReply, TaskPoll};

pub fn banner(cfg: &CLIConfig) {
    println!("Spec Generator Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Principal: {}", cfg.principal);
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                                   Show commands");
    println!("  /exit | /quit                           Exit");
    println!("  /submit <model> | <spec> [| <name>]     Generate a model spec");
    println!("  /general <product> | <spec>             Generate a general product spec");
    println!("  /poll <taskId>                          Show task status");
    println!("  /wait <taskId>                          Poll until the task finishes");
    println!("  /cancel <taskId>                        Cancel a running task");
    println!("  /credit                                 Show remaining credit");
    println!("  /principal <id>                         Switch principal");
    println!("  /base <url>                             Update base URL");
    println!("  /config                                 Show current config");
}

pub fn reply(reply: &SubmitReply) {
    match reply {
        SubmitReply::Finished(result) => payload(result),
        SubmitReply::Accepted(task_id) => println!("still running, task id: {}", task_id),
        SubmitReply::Failed(message) => println!("failed: {}", message),
        SubmitReply::Cancelled => println!("cancelled"),
        SubmitReply::Refused(message) => println!("refused: {}", message),
    }
}

pub fn poll(poll: &TaskPoll) {
    println!("[{}]", poll.status);
    if let Some(result) = &poll.result {
        payload(result);
    }
    if let Some(err) = &poll.error {
        println!("error: {}", err);
    }
    if let Some(at) = &poll.completed_at {
        println!("completed at: {}", at);
    }
}

fn payload(value: &Value) {
    match value.as_object() {
        Some(fields) => {
            for (key, field) in fields {
                let text = match field {
                    Value::Null => "-".to_string(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("  {:<26} {}", key, text);
            }
        }
        None => println!("{}", value),
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  principal: {}", cfg.principal);
    println!("  poll interval: {}s", cfg.poll_interval);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

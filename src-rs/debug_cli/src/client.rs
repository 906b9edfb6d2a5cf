use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::Value;

use crate::models::{GeneralRequest, SubmitReply, SubmitRequest, TaskPoll};

const PRINCIPAL_HEADER: &str = "X-Principal-Id";

pub struct HTTPClient {
    pub base_url: String,
    pub principal: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, principal: &str) -> Result<Self, String> {
        // Longer than the server's bounded wait so a slow generation still answers.
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            principal: principal.to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/generation{}", self.base_url, path)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, String> {
        req.header(PRINCIPAL_HEADER, self.principal.as_str())
            .send()
            .map_err(|err| err.to_string())
    }

    pub fn submit(&self, req: &SubmitRequest) -> Result<SubmitReply, String> {
        let resp = self.send(self.client.post(self.url("/generate-spec")).json(req))?;
        read_reply(resp, |body| body)
    }

    pub fn general(&self, req: &GeneralRequest) -> Result<SubmitReply, String> {
        let resp = self.send(self.client.post(self.url("/generate-general-spec")).json(req))?;
        read_reply(resp, |mut body| body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    pub fn poll(&self, task_id: &str) -> Result<TaskPoll, String> {
        let resp = self.send(self.client.get(self.url(&format!("/result/{}", task_id))))?;
        expect_success(resp)?
            .json::<TaskPoll>()
            .map_err(|err| err.to_string())
    }

    pub fn cancel(&self, task_id: &str) -> Result<bool, String> {
        let resp = self.send(self.client.post(self.url(&format!("/cancel/{}", task_id))))?;
        let value = expect_success(resp)?
            .json::<Value>()
            .map_err(|err| err.to_string())?;
        Ok(value.get("success").and_then(Value::as_bool).unwrap_or(false))
    }

    pub fn credit(&self) -> Result<i64, String> {
        let resp = self.send(self.client.get(self.url("/credit")))?;
        let value = expect_success(resp)?
            .json::<Value>()
            .map_err(|err| err.to_string())?;
        value
            .get("balance")
            .and_then(Value::as_i64)
            .ok_or_else(|| format!("unexpected credit payload: {}", value))
    }
}

fn read_reply(resp: Response, finished: impl FnOnce(Value) -> Value) -> Result<SubmitReply, String> {
    let status = resp.status();
    let body = resp.json::<Value>().map_err(|err| err.to_string())?;
    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
    let (task_id, state, error) = (field("taskId"), field("status"), field("error"));
    match status {
        StatusCode::ACCEPTED => task_id
            .map(SubmitReply::Accepted)
            .ok_or_else(|| format!("accepted without task id: {}", body)),
        StatusCode::OK if state.as_deref() == Some("CANCELLED") => Ok(SubmitReply::Cancelled),
        StatusCode::OK => Ok(SubmitReply::Finished(finished(body))),
        StatusCode::FORBIDDEN => Ok(SubmitReply::Refused(error.unwrap_or_default())),
        StatusCode::INTERNAL_SERVER_ERROR => Ok(SubmitReply::Failed(error.unwrap_or_default())),
        other => Err(format!("http {}: {}", other.as_u16(), body)),
    }
}

fn expect_success(resp: Response) -> Result<Response, String> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(format!("http {}: {}", status.as_u16(), body))
    }
}

//! Request envelopes and response field extraction.

use std::sync::LazyLock;

use regex::Regex;
use stand_model::TaskParam;

const NAMESPACE: &str = "http://hflabs.ru/cdi/task/15_3";

pub(crate) fn execute_request(name: &str, params: &[TaskParam]) -> String {
    let body: String = params
        .iter()
        .map(|p| {
            format!(
                r#"<parameters name="{}"><value>{}</value></parameters>"#,
                escape(&p.name),
                escape(&p.value)
            )
        })
        .collect();
    wrap(&format!(
        "<executeTaskRequest><name>{}</name>{body}</executeTaskRequest>",
        escape(name)
    ))
}

pub(crate) fn status_request(execution_id: &str) -> String {
    wrap(&format!(
        "<getTaskStatusRequest>{}</getTaskStatusRequest>",
        escape(execution_id)
    ))
}

fn wrap(body: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="{NAMESPACE}"><soapenv:Header/><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
    )
}

fn element(tag: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?s)<(?:[\w.-]+:)?{tag}(?:\s[^>]*)?>(.*?)</(?:[\w.-]+:)?{tag}>"
    ))
    .ok()
}

static ID: LazyLock<Option<Regex>> = LazyLock::new(|| element("id"));
static STATE: LazyLock<Option<Regex>> = LazyLock::new(|| element("state"));
static DESCRIPTION: LazyLock<Option<Regex>> = LazyLock::new(|| element("description"));

fn first(re: &Option<Regex>, xml: &str) -> Option<String> {
    re.as_ref()?
        .captures(xml)
        .map(|c| unescape(c[1].trim()))
}

pub(crate) fn execution_id(xml: &str) -> Option<String> {
    first(&ID, xml).filter(|id| !id.is_empty())
}

pub(crate) fn state(xml: &str) -> Option<String> {
    first(&STATE, xml)
}

pub(crate) fn description(xml: &str) -> Option<String> {
    first(&DESCRIPTION, xml)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

//! Browser doubles for tests that run without a WebDriver endpoint
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;

use todolist_e2e::page::{INPUT_ID, TABLE_ID};
use todolist_e2e::{Browser, BrowserFactory, E2eError, E2eResult, Key, Target};

/// Counts sessions opened and closed by a factory
#[derive(Debug, Default)]
pub struct SessionCounter {
    pub launched: AtomicUsize,
    pub quit: AtomicUsize,
}

impl SessionCounter {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn quit(&self) -> usize {
        self.quit.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct LoadedPage {
    url: String,
    html: String,
}

/// A browser without JavaScript: plain HTTP requests against the live
/// server, with the rendered HTML inspected by pattern matching.
pub struct HttpBrowser {
    client: reqwest::Client,
    page: Mutex<Option<LoadedPage>>,
    typed: Mutex<String>,
    closed: Mutex<bool>,
    counter: Arc<SessionCounter>,
}

impl HttpBrowser {
    fn new(counter: Arc<SessionCounter>) -> Self {
        counter.launched.fetch_add(1, Ordering::SeqCst);
        Self {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            page: Mutex::new(None),
            typed: Mutex::new(String::new()),
            closed: Mutex::new(false),
            counter,
        }
    }

    fn loaded(&self) -> E2eResult<LoadedPage> {
        if *self.closed.lock() {
            return Err(E2eError::Browser("session is closed".into()));
        }
        self.page
            .lock()
            .clone()
            .ok_or_else(|| E2eError::Browser("no page loaded".into()))
    }

    async fn load(&self, response: reqwest::Response) -> E2eResult<()> {
        let url = response.url().to_string();
        let html = response.text().await?;
        *self.page.lock() = Some(LoadedPage { url, html });
        self.typed.lock().clear();
        Ok(())
    }

    async fn submit(&self) -> E2eResult<()> {
        let page = self.loaded()?;
        let action = capture(r#"<form method="POST" action="([^"]*)""#, &page.html)
            .ok_or_else(|| E2eError::ElementNotFound("form".into()))?;
        let url = reqwest::Url::parse(&page.url)
            .and_then(|base| base.join(&unescape(&action)))
            .map_err(|e| E2eError::Browser(e.to_string()))?;
        let text = self.typed.lock().clone();

        let response = self
            .client
            .post(url)
            .form(&[("item_text", text)])
            .send()
            .await?;
        self.load(response).await
    }
}

fn capture(pattern: &str, haystack: &str) -> Option<String> {
    Regex::new(pattern)
        .ok()?
        .captures(haystack)
        .map(|c| c[1].to_string())
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

fn rows(html: &str) -> Vec<String> {
    let re = Regex::new(r"<tr><td>(.*?)</td></tr>").unwrap();
    re.captures_iter(html).map(|c| unescape(&c[1])).collect()
}

fn input_tag(html: &str) -> Option<String> {
    capture(&format!(r#"(<input[^>]*id="{}"[^>]*>)"#, INPUT_ID), html)
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let response = self.client.get(url).send().await?;
        self.load(response).await
    }

    async fn title(&self) -> E2eResult<String> {
        let page = self.loaded()?;
        Ok(capture(r"<title>(.*?)</title>", &page.html).unwrap_or_default())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.loaded()?.url)
    }

    async fn text(&self, target: &Target) -> E2eResult<String> {
        let page = self.loaded()?;
        match target {
            Target::Tag(tag) if tag == "body" => {
                let body = capture(r"(?s)<body>(.*)</body>", &page.html).unwrap_or_default();
                let stripped = Regex::new(r"<[^>]+>").unwrap().replace_all(&body, "\n");
                Ok(stripped
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(unescape)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Target::Tag(tag) => capture(&format!(r"<{0}>(.*?)</{0}>", tag), &page.html)
                .map(|t| unescape(&t))
                .ok_or_else(|| E2eError::ElementNotFound(target.to_string())),
            Target::Id(id) if id == TABLE_ID => Ok(rows(&page.html).join("\n")),
            Target::Id(id) if id == INPUT_ID && input_tag(&page.html).is_some() => Ok(String::new()),
            Target::Id(_) => Err(E2eError::ElementNotFound(target.to_string())),
        }
    }

    async fn child_texts(&self, parent: &Target, child: &Target) -> E2eResult<Vec<String>> {
        let page = self.loaded()?;
        match (parent, child) {
            (Target::Id(id), Target::Tag(tag))
                if id == TABLE_ID && tag == "tr" && page.html.contains(TABLE_ID) =>
            {
                Ok(rows(&page.html))
            }
            _ => Err(E2eError::ElementNotFound(parent.to_string())),
        }
    }

    async fn attribute(&self, target: &Target, name: &str) -> E2eResult<Option<String>> {
        let page = self.loaded()?;
        match target {
            Target::Id(id) if id == INPUT_ID => {
                let tag = input_tag(&page.html)
                    .ok_or_else(|| E2eError::ElementNotFound(target.to_string()))?;
                Ok(capture(&format!(r#"\s{}="([^"]*)""#, name), &tag).map(|v| unescape(&v)))
            }
            _ => Err(E2eError::ElementNotFound(target.to_string())),
        }
    }

    async fn send_keys(&self, target: &Target, text: &str) -> E2eResult<()> {
        let page = self.loaded()?;
        if *target != Target::id(INPUT_ID) || input_tag(&page.html).is_none() {
            return Err(E2eError::ElementNotFound(target.to_string()));
        }
        self.typed.lock().push_str(text);
        Ok(())
    }

    async fn press_key(&self, target: &Target, key: Key) -> E2eResult<()> {
        if *target != Target::id(INPUT_ID) {
            return Err(E2eError::ElementNotFound(target.to_string()));
        }
        match key {
            Key::Enter => self.submit().await,
            _ => Ok(()),
        }
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut closed = self.closed.lock();
        if !*closed {
            *closed = true;
            self.counter.quit.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Hands out [`HttpBrowser`] sessions
#[derive(Default)]
pub struct HttpBrowserFactory {
    pub counter: Arc<SessionCounter>,
}

#[async_trait]
impl BrowserFactory for HttpBrowserFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Browser>> {
        Ok(Box::new(HttpBrowser::new(self.counter.clone())))
    }
}

/// An in-memory list page whose table lags behind: after the page loads or
/// an item is submitted, the table is missing for `lag` reads.
pub struct LaggyTable {
    url: String,
    rows: Mutex<Vec<String>>,
    lag: usize,
    hidden_reads: AtomicUsize,
    pending: Mutex<String>,
    pub reads: AtomicUsize,
    pub keys: Mutex<Vec<String>>,
}

impl LaggyTable {
    pub fn new(rows: &[&str], lag: usize) -> Self {
        Self {
            url: "http://testserver/lists/1/".to_string(),
            rows: Mutex::new(rows.iter().map(|r| r.to_string()).collect()),
            lag,
            hidden_reads: AtomicUsize::new(lag),
            pending: Mutex::new(String::new()),
            reads: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    /// Report `url` as the current page
    pub fn at(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for LaggyTable {
    async fn goto(&self, _url: &str) -> E2eResult<()> {
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok("To-Do lists".into())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.url.clone())
    }

    async fn text(&self, target: &Target) -> E2eResult<String> {
        Err(E2eError::ElementNotFound(target.to_string()))
    }

    async fn child_texts(&self, _parent: &Target, _child: &Target) -> E2eResult<Vec<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let hidden = self.hidden_reads.load(Ordering::SeqCst);
        if hidden > 0 {
            self.hidden_reads.store(hidden - 1, Ordering::SeqCst);
            return Err(E2eError::ElementNotFound(format!("#{}", TABLE_ID)));
        }
        Ok(self.rows.lock().clone())
    }

    async fn attribute(&self, _target: &Target, _name: &str) -> E2eResult<Option<String>> {
        Ok(None)
    }

    async fn send_keys(&self, _target: &Target, text: &str) -> E2eResult<()> {
        self.keys.lock().push(text.to_string());
        self.pending.lock().push_str(text);
        Ok(())
    }

    async fn press_key(&self, _target: &Target, key: Key) -> E2eResult<()> {
        self.keys.lock().push(format!("<{}>", key.as_str()));
        if key == Key::Enter {
            let text = std::mem::take(&mut *self.pending.lock());
            let mut rows = self.rows.lock();
            let position = rows.len() + 1;
            rows.push(format!("{}: {}", position, text));
            self.hidden_reads.store(self.lag, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn quit(&self) -> E2eResult<()> {
        Ok(())
    }
}

use crate::http_client;
use htmlescape::decode_html;
use isahc::Request;
use mockall::automock;
use rss::Channel;
use std::io;

const USER_AGENT: &str = "feedpoll";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FetchError {
    Network { msg: String },
    HttpStatus { status: u16 },
    Decode { msg: String },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FetchedFeedItem {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub pub_date: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FetchedFeed {
    pub title: String,
    pub description: String,
    pub items: Vec<FetchedFeedItem>,
}

#[automock]
pub trait ReadFeed {
    fn read(&self, url: &str) -> Result<FetchedFeed, FetchError>;
}

/// Single-attempt RSS fetcher. Retrying a broken feed is the scheduler's
/// round-robin turn order's job, not the reader's.
pub struct RssReader;

impl RssReader {
    pub fn new() -> Self {
        RssReader
    }

    pub fn parse(data: &[u8]) -> Result<FetchedFeed, FetchError> {
        match Channel::read_from(data) {
            Ok(channel) => Ok(FetchedFeed::from(channel)),
            Err(err) => Err(FetchError::Decode {
                msg: format!("{err}"),
            }),
        }
    }
}

impl Default for RssReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadFeed for RssReader {
    fn read(&self, url: &str) -> Result<FetchedFeed, FetchError> {
        let body = read_url(url)?;

        Self::parse(&body)
    }
}

impl From<Channel> for FetchedFeed {
    fn from(channel: Channel) -> Self {
        let mut items = channel
            .items()
            .iter()
            .filter(|item| item.link().is_some())
            .map(|item| FetchedFeedItem {
                title: unescape(item.title().unwrap_or_default()),
                description: item.description().map(unescape),
                link: item.link().unwrap().to_string(),
                pub_date: item.pub_date().map(|date| date.to_string()),
            })
            .collect::<Vec<FetchedFeedItem>>();

        items.dedup_by(|a, b| a.link == b.link && a.title == b.title);

        FetchedFeed {
            title: unescape(channel.title()),
            description: unescape(channel.description()),
            items,
        }
    }
}

pub fn read_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = http_client::client();

    let request = Request::get(url)
        .header("Content-Type", "application/rss+xml")
        .header("User-Agent", USER_AGENT)
        .body(());

    let Ok(request) = request else {
        return Err(FetchError::Network {
            msg: "Invalid URL".to_string(),
        });
    };

    match client.send(request) {
        Ok(mut response) => {
            if !response.status().is_success() {
                return Err(FetchError::HttpStatus {
                    status: response.status().as_u16(),
                });
            }

            let mut writer: Vec<u8> = vec![];

            if let Err(err) = io::copy(response.body_mut(), &mut writer) {
                let msg = format!("{err:?}");

                return Err(FetchError::Network { msg });
            }

            Ok(writer)
        }
        Err(error) => {
            let msg = format!("{error:?}");

            Err(FetchError::Network { msg })
        }
    }
}

// Feeds often double-encode entities, so decoding has to run after the XML
// parser already resolved the first layer. A stray bare `&` makes
// decode_html fail; the text is passed through untouched in that case.
fn unescape(text: &str) -> String {
    decode_html(text).unwrap_or_else(|_| text.to_string())
}

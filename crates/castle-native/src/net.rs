//! Blocking HTTP on a worker thread. The frame loop sends jobs and polls
//! replies without waiting.

use castle_core::error::AdapterError;
use castle_core::location::GeoTicket;
use castle_core::sources::{
    self, ForecastReading, GEOCODE_RETRIES, GEOCODE_RETRY_DELAY, USER_AGENT,
};
use castle_core::{Coordinate, FetchTicket};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub enum Job {
    Forecast(FetchTicket),
    Geocode(GeoTicket, Coordinate),
}

pub enum Reply {
    Forecast(FetchTicket, Result<ForecastReading, AdapterError>),
    Geocode(GeoTicket, Result<String, AdapterError>),
}

pub struct Worker {
    jobs: Sender<Job>,
    replies: Receiver<Reply>,
}

impl Worker {
    pub fn spawn() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (reply_tx, replies) = mpsc::channel();
        thread::Builder::new()
            .name("castle-net".into())
            .spawn(move || {
                for job in job_rx {
                    let reply = match job {
                        Job::Forecast(ticket) => {
                            Reply::Forecast(ticket, fetch_forecast(&client, ticket.coord))
                        }
                        Job::Geocode(ticket, coord) => {
                            Reply::Geocode(ticket, reverse_geocode(&client, coord))
                        }
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                log::debug!("network worker stopped");
            })?;
        Ok(Self { jobs, replies })
    }

    pub fn send(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            log::warn!("network worker is gone; request dropped");
        }
    }

    pub fn try_recv(&self) -> Option<Reply> {
        self.replies.try_recv().ok()
    }
}

fn get_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, AdapterError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AdapterError::Transport(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterError::Status(status.as_u16()));
    }
    resp.text().map_err(|e| AdapterError::Transport(e.to_string()))
}

fn fetch_forecast(
    client: &reqwest::blocking::Client,
    coord: Coordinate,
) -> Result<ForecastReading, AdapterError> {
    sources::parse_forecast(&get_text(client, &sources::forecast_url(coord))?)
}

fn reverse_geocode(
    client: &reqwest::blocking::Client,
    coord: Coordinate,
) -> Result<String, AdapterError> {
    let url = sources::reverse_geocode_url(coord);
    pollster::block_on(sources::with_retry(
        GEOCODE_RETRIES,
        GEOCODE_RETRY_DELAY,
        || {
            let r = get_text(client, &url).and_then(|body| sources::parse_place_name(&body));
            std::future::ready(r)
        },
        |d| {
            thread::sleep(d);
            std::future::ready(())
        },
    ))
}

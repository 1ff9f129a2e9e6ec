use std::collections::HashMap;

use texting_robots::Robot;

use crate::downloader::Fetch;
use crate::util;

/// Caches one robots.txt per host and answers whether a url may be fetched.
pub struct GuardRobot {
    user_agent: String,
    robots: HashMap<String, Option<Robot>>,
}

impl GuardRobot {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_owned(),
            robots: HashMap::new(),
        }
    }

    pub async fn is_allowed(&mut self, url: &str, fetcher: &(dyn Fetch + Send + Sync)) -> bool {
        let host = match util::get_host(url) {
            Some(host) => host, // robot rules doesn't apply otherwise
            None => return true,
        };
        let robot_url = match util::get_robot_url(url) {
            Some(robot_url) => robot_url,
            None => return true,
        };

        if !self.robots.contains_key(&host) {
            let robot = match fetcher.fetch(&robot_url).await {
                Ok(body) => Robot::new(&self.user_agent, &body).ok(),
                Err(e) => {
                    log::debug!("no robots.txt for {}: {}", host, e);
                    None
                }
            };
            self.robots.insert(host.clone(), robot);
        }

        match self.robots.get(&host) {
            Some(Some(robot)) => robot.allowed(url),
            _ => true,
        }
    }
}

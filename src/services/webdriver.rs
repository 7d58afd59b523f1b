// src/services/webdriver.rs

//! WebDriver-backed portal implementation.
//!
//! Drives headless Chrome through a WebDriver server (chromedriver). The
//! target page is an ASP.NET WebForms form: selecting the region or POU
//! dropdown triggers a postback that repopulates the dependent dropdowns, so
//! a fixed settle delay follows every selection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::portal::{Filter, RegistrationPortal};

/// Browser session against the registration site.
pub struct WebDriverPortal {
    config: Arc<Config>,
    driver: Option<WebDriver>,
}

impl WebDriverPortal {
    /// Start a browser session against the configured WebDriver server.
    pub async fn connect(config: Arc<Config>) -> Result<Self> {
        let wd = &config.webdriver;

        let mut caps = DesiredCapabilities::chrome();
        if wd.headless {
            caps.set_headless()?;
        }
        caps.add_arg(&format!("--user-agent={}", wd.user_agent))?;
        for arg in &wd.chrome_args {
            caps.add_arg(arg)?;
        }

        let driver = WebDriver::new(&wd.server_url, caps).await?;

        // the session exists from here on; quit before surfacing setup errors
        if let Err(e) = driver
            .set_page_load_timeout(Duration::from_secs(wd.page_timeout_secs))
            .await
        {
            if let Err(quit_err) = driver.quit().await {
                log::warn!("Failed to quit browser session after setup error: {quit_err}");
            }
            return Err(e.into());
        }

        log::info!("Browser session started via {}", wd.server_url);
        Ok(Self {
            config,
            driver: Some(driver),
        })
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver
            .as_ref()
            .ok_or_else(|| AppError::portal("session", "browser session already closed"))
    }

    /// Wait for an element to appear, bounded by the configured timeout.
    async fn find(&self, css: &str) -> Result<WebElement> {
        let wd = &self.config.webdriver;
        self.driver()?
            .query(By::Css(css))
            .wait(
                Duration::from_secs(wd.page_timeout_secs),
                Duration::from_millis(wd.poll_interval_ms),
            )
            .first()
            .await
            .map_err(|e| AppError::portal(css, e))
    }

    /// Select a dropdown option by its visible text.
    async fn select_option(&self, css: &str, value: &str) -> Result<()> {
        let elem = self.find(css).await?;
        let select = SelectElement::new(&elem)
            .await
            .map_err(|e| AppError::portal(css, e))?;
        select
            .select_by_exact_text(value)
            .await
            .map_err(|e| AppError::portal(css, format!("option '{value}': {e}")))?;
        Ok(())
    }

    /// Give the page time to finish a postback-triggered refresh.
    async fn settle(&self) {
        let ms = self.config.webdriver.settle_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl RegistrationPortal for WebDriverPortal {
    async fn open(&mut self) -> Result<()> {
        log::info!("Opening {}", self.config.site.url);
        self.driver()?.goto(&self.config.site.url).await?;
        self.settle().await;
        Ok(())
    }

    async fn apply_filter(&mut self, filter: Filter, value: &str) -> Result<()> {
        let css = match filter {
            Filter::Region => self.config.selectors.region.as_str(),
            Filter::Pou => self.config.selectors.pou.as_str(),
        };
        log::debug!("Selecting {} = {}", filter.name(), value);
        self.select_option(css, value).await?;
        // dependent dropdowns repopulate via postback
        self.settle().await;
        Ok(())
    }

    async fn select_course(&mut self, course: &str) -> Result<()> {
        log::debug!("Selecting course = {}", course);
        self.select_option(self.config.selectors.course.as_str(), course)
            .await?;
        self.settle().await;
        Ok(())
    }

    async fn trigger_query(&mut self) -> Result<()> {
        let css = self.config.selectors.query_button.as_str();
        let button = self.find(css).await?;
        button.click().await.map_err(|e| AppError::portal(css, e))?;

        let ms = self.config.webdriver.result_wait_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        Ok(())
    }

    async fn read_result_text(&mut self) -> Result<String> {
        let css = self.config.selectors.result_region.as_str();
        let elem = self.find(css).await?;
        let text = elem.text().await.map_err(|e| AppError::portal(css, e))?;
        Ok(text)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
            log::info!("Browser session closed");
        }
        Ok(())
    }
}

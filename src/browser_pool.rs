//! Browser pool management for concurrent Chrome instances
//!
//! Maintains a small pool of headless Chrome instances shared across menu
//! extraction requests. Each request checks out one instance, opens its own
//! page on it, and returns the instance when the handle drops.

use crate::{create_browser_config, Config, ScrapeError};
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Current status of a browser instance in the pool.
#[derive(Debug, Clone, Copy)]
pub enum InstanceStatus {
    /// Instance is ready and available for use
    Healthy,
    /// Instance is currently serving a request
    Busy,
    /// Instance is being restarted due to issues
    Restarting,
    /// Instance has failed and needs replacement
    Failed,
}

/// One Chrome instance plus its CDP handler task and usage statistics.
#[derive(Debug)]
pub struct BrowserInstance {
    pub id: usize,
    pub browser: Arc<Mutex<Browser>>,
    /// Background task pumping Chrome DevTools Protocol events.
    pub handler: tokio::task::JoinHandle<Result<(), chromiumoxide::error::CdpError>>,
    pub last_used: Instant,
    /// Total number of pages rendered by this instance
    pub pages_rendered: usize,
    pub status: InstanceStatus,
    pub created_at: Instant,
    pub failure_count: usize,
}

impl BrowserInstance {
    pub fn new(
        id: usize,
        browser: Browser,
        handler: tokio::task::JoinHandle<Result<(), chromiumoxide::error::CdpError>>,
    ) -> Self {
        Self {
            id,
            browser: Arc::new(Mutex::new(browser)),
            handler,
            last_used: Instant::now(),
            pages_rendered: 0,
            status: InstanceStatus::Healthy,
            created_at: Instant::now(),
            failure_count: 0,
        }
    }

    pub fn mark_used(&mut self) {
        self.last_used = Instant::now();
        self.pages_rendered += 1;
        self.status = InstanceStatus::Busy;
    }

    pub fn mark_available(&mut self) {
        self.status = InstanceStatus::Healthy;
    }

    pub fn mark_failed(&mut self) {
        self.failure_count += 1;
        self.status = InstanceStatus::Failed;
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, InstanceStatus::Healthy)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub async fn shutdown(self) {
        let _ = self.browser.lock().await.close().await;
        self.handler.abort();
    }
}

/// Checked-out browser access. Returning the instance to the pool happens
/// on drop, so every exit path releases it. The guard also holds the
/// semaphore permit so the pool's concurrency bound covers the whole
/// checkout, not just acquisition.
pub struct BrowserGuard {
    pub browser: Arc<Mutex<Browser>>,
    pub instance_id: usize,
    pool: Arc<BrowserPool>,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl BrowserGuard {
    fn new(
        browser: Arc<Mutex<Browser>>,
        instance_id: usize,
        pool: Arc<BrowserPool>,
        permit: tokio::sync::OwnedSemaphorePermit,
    ) -> Self {
        Self {
            browser,
            instance_id,
            pool,
            _permit: permit,
        }
    }
}

impl Drop for BrowserGuard {
    fn drop(&mut self) {
        let pool = self.pool.clone();
        let instance_id = self.instance_id;

        tokio::spawn(async move {
            pool.return_browser(instance_id).await;
        });
    }
}

pub struct BrowserPool {
    instances: Arc<Mutex<Vec<BrowserInstance>>>,
    available: Arc<Mutex<VecDeque<usize>>>,
    semaphore: Arc<Semaphore>,
    config: Config,
    is_shutting_down: Arc<std::sync::atomic::AtomicBool>,
}

impl BrowserPool {
    pub async fn new(config: Config) -> Result<Self, ScrapeError> {
        let pool = Self {
            instances: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(Mutex::new(VecDeque::new())),
            semaphore: Arc::new(Semaphore::new(config.browser_pool_size)),
            config: config.clone(),
            is_shutting_down: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };

        pool.initialize_instances().await?;
        pool.start_maintenance_task().await;

        Ok(pool)
    }

    async fn initialize_instances(&self) -> Result<(), ScrapeError> {
        let mut instances = self.instances.lock().await;
        let mut available = self.available.lock().await;

        for i in 0..self.config.browser_pool_size {
            // Stagger launches to avoid Chrome singleton races
            if i > 0 {
                sleep(Duration::from_millis(500)).await;
            }

            match self.create_browser_instance(i).await {
                Ok(instance) => {
                    instances.push(instance);
                    available.push_back(i);
                    info!("Browser instance {} created successfully", i);
                }
                Err(e) => {
                    error!("Failed to create browser instance {}: {}", i, e);
                    return Err(e);
                }
            }
        }

        info!("Browser pool initialized with {} instances", instances.len());
        Ok(())
    }

    async fn create_browser_instance(&self, id: usize) -> Result<BrowserInstance, ScrapeError> {
        let user_data_dir = format!("/tmp/chromium-menu-{}-{}", std::process::id(), id);
        std::fs::create_dir_all(&user_data_dir)
            .map_err(|e| ScrapeError::BrowserLaunchFailed(format!("user data dir: {e}")))?;

        let instance_config = create_browser_config(&self.config, id);

        let (browser, mut handler) = Browser::launch(instance_config)
            .await
            .map_err(|e| ScrapeError::BrowserLaunchFailed(e.to_string()))?;

        // The handler implements Stream and must be polled for the CDP
        // connection to make progress.
        let handler_task = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::error!("CDP handler error: {}", e);
                        return Err(e);
                    }
                    None => {
                        tracing::info!("CDP handler stream ended");
                        break;
                    }
                }
            }
            Ok(())
        });

        Ok(BrowserInstance::new(id, browser, handler_task))
    }

    pub async fn get_browser(&self) -> Result<BrowserGuard, ScrapeError> {
        if self.is_shutting_down.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(ScrapeError::BrowserUnavailable);
        }

        let mut permit = Some(
            self.semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ScrapeError::BrowserUnavailable)?,
        );

        // A checked-out instance may have died since its last use; retry
        // across instances, restarting where needed.
        for attempt in 0..3 {
            let instance_id = {
                let mut available = self.available.lock().await;
                available
                    .pop_front()
                    .ok_or(ScrapeError::BrowserUnavailable)?
            };

            // Check health and release the instances lock before any
            // restart, which needs that lock itself.
            let browser = {
                let mut instances = self.instances.lock().await;
                let instance = instances
                    .get_mut(instance_id)
                    .ok_or(ScrapeError::BrowserUnavailable)?;

                if instance.is_healthy() && !instance.handler.is_finished() {
                    instance.mark_used();
                    Some(instance.browser.clone())
                } else {
                    None
                }
            };

            let browser = match browser {
                Some(browser) => browser,
                None => {
                    warn!(
                        "Browser instance {} unhealthy (attempt {}), attempting restart",
                        instance_id,
                        attempt + 1
                    );

                    match self.restart_instance_internal(instance_id).await {
                        Ok(()) => {
                            let mut instances = self.instances.lock().await;
                            let instance = instances
                                .get_mut(instance_id)
                                .ok_or(ScrapeError::BrowserUnavailable)?;
                            instance.mark_used();
                            instance.browser.clone()
                        }
                        Err(e) => {
                            error!("Failed to restart browser instance {}: {}", instance_id, e);
                            self.available.lock().await.push_back(instance_id);
                            if attempt < 2 {
                                continue;
                            }
                            return Err(e);
                        }
                    }
                }
            };

            let permit = permit.take().ok_or(ScrapeError::BrowserUnavailable)?;
            return Ok(BrowserGuard::new(
                browser,
                instance_id,
                Arc::new(self.clone()),
                permit,
            ));
        }

        Err(ScrapeError::BrowserUnavailable)
    }

    pub async fn return_browser(&self, instance_id: usize) {
        let mut instances = self.instances.lock().await;
        let mut available = self.available.lock().await;

        if let Some(instance) = instances.get_mut(instance_id) {
            // A failed instance still goes back in the queue, but keeps its
            // status so the next checkout restarts it.
            if !matches!(instance.status, InstanceStatus::Failed) {
                instance.mark_available();
            }
            available.push_back(instance_id);
        }
    }

    /// Records a render fault against an instance. The instance keeps
    /// serving until checkout or maintenance decides to restart it; the
    /// failure count feeds the maintenance restart criterion.
    pub async fn mark_instance_failed(&self, instance_id: usize) {
        let mut instances = self.instances.lock().await;
        if let Some(instance) = instances.get_mut(instance_id) {
            instance.mark_failed();
        }
    }

    pub async fn restart_instance(&self, instance_id: usize) -> Result<(), ScrapeError> {
        self.restart_instance_internal(instance_id).await
    }

    async fn restart_instance_internal(&self, instance_id: usize) -> Result<(), ScrapeError> {
        let mut instances = self.instances.lock().await;

        if let Some(instance) = instances.get_mut(instance_id) {
            instance.status = InstanceStatus::Restarting;

            let _ = instance.browser.lock().await.close().await;
            instance.handler.abort();

            match self.create_browser_instance(instance_id).await {
                Ok(new_instance) => {
                    *instance = new_instance;
                    info!("Browser instance {} restarted successfully", instance_id);
                    Ok(())
                }
                Err(e) => {
                    instance.status = InstanceStatus::Failed;
                    error!("Failed to restart browser instance {}: {}", instance_id, e);
                    Err(e)
                }
            }
        } else {
            Err(ScrapeError::BrowserUnavailable)
        }
    }

    async fn start_maintenance_task(&self) {
        let pool = Arc::new(self.clone());
        let is_shutting_down = self.is_shutting_down.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));

            while !is_shutting_down.load(std::sync::atomic::Ordering::Relaxed) {
                interval.tick().await;
                pool.restart_stale_instances().await;
            }
        });
    }

    async fn restart_stale_instances(&self) {
        let instances_to_restart = {
            let instances = self.instances.lock().await;
            instances
                .iter()
                .filter(|instance| {
                    instance.handler.is_finished()
                        || instance.failure_count > 10
                        || instance.age() > Duration::from_secs(3600)
                })
                .map(|instance| instance.id)
                .collect::<Vec<_>>()
        };

        // Restart outside the lock
        for instance_id in instances_to_restart {
            info!("Scheduling restart for browser instance {}", instance_id);
            if let Err(e) = self.restart_instance(instance_id).await {
                error!(
                    "Failed to restart browser instance {} during maintenance: {}",
                    instance_id, e
                );
            }
        }
    }

    pub async fn shutdown(&self) {
        info!("Shutting down browser pool...");
        self.is_shutting_down
            .store(true, std::sync::atomic::Ordering::Relaxed);

        // Give in-flight requests a moment to return their instances
        let mut retries = 0;
        while retries < 10 {
            let available_count = self.available.lock().await.len();
            if available_count == self.config.browser_pool_size {
                break;
            }

            sleep(Duration::from_millis(100)).await;
            retries += 1;
        }

        let mut instances = self.instances.lock().await;
        for instance in instances.drain(..) {
            instance.shutdown().await;
        }

        info!("Browser pool shutdown complete");
    }

    pub async fn get_stats(&self) -> BrowserPoolStats {
        let instances = self.instances.lock().await;
        let available = self.available.lock().await;

        let mut healthy_count = 0;
        let mut busy_count = 0;
        let mut failed_count = 0;
        let mut total_pages = 0;

        for instance in instances.iter() {
            total_pages += instance.pages_rendered;
            match instance.status {
                InstanceStatus::Healthy => healthy_count += 1,
                InstanceStatus::Busy => busy_count += 1,
                InstanceStatus::Failed => failed_count += 1,
                _ => {}
            }
        }

        BrowserPoolStats {
            total_instances: instances.len(),
            healthy_instances: healthy_count,
            busy_instances: busy_count,
            failed_instances: failed_count,
            available_instances: available.len(),
            total_pages_rendered: total_pages,
        }
    }
}

impl Clone for BrowserPool {
    fn clone(&self) -> Self {
        Self {
            instances: self.instances.clone(),
            available: self.available.clone(),
            semaphore: self.semaphore.clone(),
            config: self.config.clone(),
            is_shutting_down: self.is_shutting_down.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowserPoolStats {
    pub total_instances: usize,
    pub healthy_instances: usize,
    pub busy_instances: usize,
    pub failed_instances: usize,
    pub available_instances: usize,
    pub total_pages_rendered: usize,
}

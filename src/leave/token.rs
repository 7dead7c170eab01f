//! Bearer token state for the leave API client.
//!
//! Refresh is single flight: the first caller that sees a stale token moves
//! the state to `Refreshing` and performs the refresh, later callers queue a
//! oneshot and are released with the outcome when it completes.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::LeaveFetchError;

#[derive(Debug, Clone, PartialEq)]
pub struct Tokens {
    pub access_token: String,
    /// Some servers rotate the refresh token on every refresh.
    pub refresh_token: Option<String>,
}

type Waiter = oneshot::Sender<Option<String>>;

enum RefreshPhase {
    Idle,
    Refreshing(Vec<Waiter>),
}

struct TokenState {
    access: Option<String>,
    refresh: Option<String>,
    phase: RefreshPhase,
}

pub struct TokenManager {
    state: Mutex<TokenState>,
}

enum Turn {
    Owner(Option<String>),
    Waiter(oneshot::Receiver<Option<String>>),
    AlreadyFresh(String),
}

impl TokenManager {
    pub fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            state: Mutex::new(TokenState {
                access,
                refresh,
                phase: RefreshPhase::Idle,
            }),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("token state poisoned")
            .access
            .clone()
    }

    #[cfg(test)]
    pub fn is_refreshing(&self) -> bool {
        matches!(
            self.state.lock().expect("token state poisoned").phase,
            RefreshPhase::Refreshing(_)
        )
    }

    /// Replaces `stale` with a fresh access token.
    ///
    /// If another caller already swapped the token since `stale` was read,
    /// the current token is returned without refreshing again.
    pub async fn refresh<F, Fut>(
        &self,
        stale: Option<&str>,
        refresh_fn: F,
    ) -> Result<String, LeaveFetchError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Tokens, LeaveFetchError>>,
    {
        let turn = {
            let mut state = self.state.lock().expect("token state poisoned");
            if let RefreshPhase::Refreshing(waiters) = &mut state.phase {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Turn::Waiter(rx)
            } else if let Some(current) = state.access.as_deref().filter(|c| Some(*c) != stale) {
                Turn::AlreadyFresh(current.to_string())
            } else {
                state.phase = RefreshPhase::Refreshing(Vec::new());
                Turn::Owner(state.refresh.clone())
            }
        };

        let refresh_token = match turn {
            Turn::AlreadyFresh(token) => return Ok(token),
            Turn::Waiter(rx) => {
                debug!("Waiting for in-flight token refresh");
                return match rx.await {
                    Ok(Some(token)) => Ok(token),
                    _ => Err(LeaveFetchError::Unauthorized),
                };
            }
            Turn::Owner(refresh_token) => refresh_token,
        };

        let mut guard = RefreshGuard {
            manager: self,
            finished: false,
        };

        let outcome = match refresh_token {
            Some(token) => refresh_fn(token).await,
            None => {
                warn!("Leave API token expired and no refresh token is configured");
                Err(LeaveFetchError::Unauthorized)
            }
        };

        guard.finish(outcome.as_ref().ok());
        outcome.map(|tokens| tokens.access_token)
    }

    fn complete(&self, tokens: Option<&Tokens>) {
        let mut state = self.state.lock().expect("token state poisoned");

        if let Some(tokens) = tokens {
            state.access = Some(tokens.access_token.clone());
            if let Some(refresh) = &tokens.refresh_token {
                state.refresh = Some(refresh.clone());
            }
        }

        let waiters = match std::mem::replace(&mut state.phase, RefreshPhase::Idle) {
            RefreshPhase::Refreshing(waiters) => waiters,
            RefreshPhase::Idle => Vec::new(),
        };
        drop(state);

        let released = tokens.map(|t| t.access_token.clone());
        for waiter in waiters {
            // receiver may have been dropped by a cancelled request
            let _ = waiter.send(released.clone());
        }
    }
}

/// Returns the state to `Idle` even if the owning request is dropped mid-refresh.
struct RefreshGuard<'a> {
    manager: &'a TokenManager,
    finished: bool,
}

impl RefreshGuard<'_> {
    fn finish(&mut self, tokens: Option<&Tokens>) {
        self.finished = true;
        self.manager.complete(tokens);
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.manager.complete(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn rotated(access: &str) -> Tokens {
        Tokens {
            access_token: access.to_string(),
            refresh_token: Some(format!("{access}-refresh")),
        }
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_request() {
        let manager = TokenManager::new(Some("old".into()), Some("r1".into()));
        let calls = AtomicUsize::new(0);

        let refresh = |token: String| {
            let calls = &calls;
            async move {
                assert_eq!(token, "r1");
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(rotated("new"))
            }
        };

        let (a, b, c) = tokio::join!(
            manager.refresh(Some("old"), refresh),
            manager.refresh(Some("old"), refresh),
            manager.refresh(Some("old"), refresh),
        );

        assert_eq!(a.unwrap(), "new");
        assert_eq!(b.unwrap(), "new");
        assert_eq!(c.unwrap(), "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.access_token().as_deref(), Some("new"));
        assert!(!manager.is_refreshing());
    }

    #[tokio::test]
    async fn stale_caller_gets_current_token_without_refreshing() {
        let manager = TokenManager::new(Some("current".into()), Some("r".into()));

        let token = manager
            .refresh(Some("expired"), |_| async {
                Err::<Tokens, _>(LeaveFetchError::Api("refresh must not run".into()))
            })
            .await
            .unwrap();

        assert_eq!(token, "current");
    }

    #[tokio::test]
    async fn failed_refresh_releases_waiters_as_unauthorized() {
        let manager = TokenManager::new(Some("old".into()), Some("r".into()));

        let failing = |_| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(LeaveFetchError::Unauthorized)
        };

        let (a, b) = tokio::join!(
            manager.refresh(Some("old"), failing),
            manager.refresh(Some("old"), failing),
        );

        assert!(matches!(a, Err(LeaveFetchError::Unauthorized)));
        assert!(matches!(b, Err(LeaveFetchError::Unauthorized)));
        assert_eq!(manager.access_token().as_deref(), Some("old"));
        assert!(!manager.is_refreshing());
    }

    #[tokio::test]
    async fn missing_refresh_token_is_unauthorized() {
        let manager = TokenManager::new(None, None);
        let result = manager
            .refresh(None, |_| async { Ok(rotated("x")) })
            .await;
        assert!(matches!(result, Err(LeaveFetchError::Unauthorized)));
    }

    #[tokio::test]
    async fn rotated_refresh_token_is_kept() {
        let manager = TokenManager::new(Some("a".into()), Some("r1".into()));
        manager
            .refresh(Some("a"), |_| async { Ok(rotated("b")) })
            .await
            .unwrap();

        let seen = manager
            .refresh(Some("b"), |token| async move {
                assert_eq!(token, "b-refresh");
                Ok(rotated("c"))
            })
            .await
            .unwrap();
        assert_eq!(seen, "c");
    }
}

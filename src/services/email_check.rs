use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use std::time::Duration;

/// Outcome of a deliverability probe
#[derive(Debug, Clone, PartialEq)]
pub enum Deliverability {
    /// Domain accepts mail, or could not be probed in time
    Deliverable,
    /// Domain definitely does not accept mail
    Undeliverable { reason: String },
}

/// Checks whether the domain part of an address can receive mail
#[async_trait]
pub trait EmailDeliverability: Send + Sync {
    async fn check(&self, email: &str) -> Deliverability;
}

/// Skips the DNS probe entirely
pub struct AcceptAllEmails;

#[async_trait]
impl EmailDeliverability for AcceptAllEmails {
    async fn check(&self, _email: &str) -> Deliverability {
        Deliverability::Deliverable
    }
}

/// DNS-backed checker: MX records first, then A/AAAA as the implicit MX.
/// The resolver keeps its own answer cache across calls.
pub struct DnsEmailChecker {
    resolver: TokioAsyncResolver,
}

impl DnsEmailChecker {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 1024;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    async fn check_domain(&self, domain: &str) -> Deliverability {
        // Fully qualified so resolver search domains are not appended
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        let exchanges = self
            .resolver
            .mx_lookup(fqdn.as_str())
            .await
            .map(|lookup| {
                lookup
                    .iter()
                    .map(|mx| match mx.exchange() {
                        name if name.is_root() => ".".to_string(),
                        name => name.to_string(),
                    })
                    .collect()
            })
            .map_err(|e| lookup_failure(domain, &e));
        if let Some(verdict) = mx_verdict(domain, exchanges) {
            return verdict;
        }

        let addresses = self
            .resolver
            .lookup_ip(fqdn.as_str())
            .await
            .map(|ips| ips.iter().count())
            .map_err(|e| lookup_failure(domain, &e));
        address_verdict(domain, addresses)
    }
}

/// Why a DNS query produced no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    NoRecords,
    Timeout,
    Other,
}

fn lookup_failure(domain: &str, e: &ResolveError) -> LookupFailure {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => LookupFailure::NoRecords,
        ResolveErrorKind::Timeout => {
            tracing::warn!("DNS lookup for {} timed out, accepting address", domain);
            LookupFailure::Timeout
        }
        _ => {
            tracing::warn!("DNS lookup for {} failed: {}", domain, e);
            LookupFailure::Other
        }
    }
}

/// Verdict from the MX answer, given as exchange names (`"."` is the root).
/// `None` means fall back to the A/AAAA lookup.
pub fn mx_verdict(
    domain: &str,
    answer: Result<Vec<String>, LookupFailure>,
) -> Option<Deliverability> {
    match answer {
        Ok(exchanges) if exchanges.is_empty() => None,
        // RFC 7505 null MX
        Ok(exchanges) if exchanges.iter().all(|name| name == ".") => {
            Some(Deliverability::Undeliverable {
                reason: format!("The domain name {} does not accept email.", domain),
            })
        }
        Ok(_) => Some(Deliverability::Deliverable),
        Err(failure) => failure_verdict(domain, failure),
    }
}

/// Verdict from the A/AAAA answer, given as the number of addresses.
pub fn address_verdict(domain: &str, answer: Result<usize, LookupFailure>) -> Deliverability {
    match answer {
        Ok(0) => no_records(domain),
        Ok(_) => Deliverability::Deliverable,
        Err(failure) => failure_verdict(domain, failure).unwrap_or_else(|| no_records(domain)),
    }
}

fn failure_verdict(domain: &str, failure: LookupFailure) -> Option<Deliverability> {
    match failure {
        LookupFailure::NoRecords => None,
        LookupFailure::Timeout => Some(Deliverability::Deliverable),
        LookupFailure::Other => Some(no_records(domain)),
    }
}

fn no_records(domain: &str) -> Deliverability {
    Deliverability::Undeliverable {
        reason: format!("The domain name {} does not exist.", domain),
    }
}

#[async_trait]
impl EmailDeliverability for DnsEmailChecker {
    async fn check(&self, email: &str) -> Deliverability {
        match email_domain(email) {
            Some(domain) => self.check_domain(domain).await,
            None => Deliverability::Undeliverable {
                reason: "The email address is not valid. It must have exactly one @-sign."
                    .to_string(),
            },
        }
    }
}

/// Domain part of an address, if it has exactly one `@`.
pub fn email_domain(email: &str) -> Option<&str> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || local.contains('@') {
        return None;
    }
    Some(domain)
}

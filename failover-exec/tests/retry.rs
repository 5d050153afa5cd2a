use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use failover_core::types::{JitterMode, RetrySpec};
use failover_exec::retry::{
    decide_retry, parse_retry_after, FailureClass, FallbackReason, Jitter, RetryClassifier,
    RetryConfig, RetryDecision, RetryReason,
};
use failover_exec::{ExecutorConfig, StrategyError};

fn no_rand() -> u64 {
    panic!("rng must not be consulted without jitter")
}

#[test]
fn default_schedule_is_400_then_800() {
    let cfg = RetryConfig {
        max_attempts_per_strategy: 3,
        ..Default::default()
    };
    assert_eq!(
        cfg.schedule(),
        vec![Duration::from_millis(400), Duration::from_millis(800)]
    );

    // Default allows two invocations, so exactly one sleep.
    assert_eq!(RetryConfig::default().schedule(), vec![Duration::from_millis(400)]);
}

#[test]
fn backoff_is_clamped_to_max_delay() {
    let cfg = RetryConfig {
        max_delay: Duration::from_millis(1000),
        ..Default::default()
    };
    assert_eq!(cfg.backoff(2), Duration::from_millis(800));
    assert_eq!(cfg.backoff(3), Duration::from_millis(1000));
    assert_eq!(cfg.backoff(30), Duration::from_millis(1000));
}

#[test]
fn non_retryable_class_falls_back_immediately() {
    let decision = decide_retry(
        &RetryConfig::default(),
        1,
        FailureClass::NonRetryable { status: 405 },
        None,
        no_rand,
    );
    assert_eq!(
        decision,
        RetryDecision::Fallback {
            reason: FallbackReason::NonRetryable { status: 405 }
        }
    );
}

#[test]
fn transient_failure_retries_until_attempts_run_out() {
    let cfg = RetryConfig::default();

    let first = decide_retry(&cfg, 1, FailureClass::Transient, None, no_rand);
    assert_eq!(
        first,
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(400),
            reason: RetryReason::Backoff
        }
    );

    let second = decide_retry(&cfg, 2, FailureClass::Transient, None, no_rand);
    assert_eq!(
        second,
        RetryDecision::Fallback {
            reason: FallbackReason::AttemptsExhausted { attempts: 2 }
        }
    );
}

#[test]
fn single_attempt_never_sleeps() {
    let cfg = RetryConfig {
        max_attempts_per_strategy: 1,
        ..Default::default()
    };
    assert!(cfg.schedule().is_empty());
    assert!(matches!(
        decide_retry(&cfg, 1, FailureClass::Transient, None, no_rand),
        RetryDecision::Fallback { .. }
    ));
}

#[test]
fn full_jitter_stays_within_backoff() {
    let cfg = RetryConfig {
        jitter: Jitter::Full,
        ..Default::default()
    };
    for seed in [0u64, 1, 399, 400, 401, u64::MAX] {
        match decide_retry(&cfg, 1, FailureClass::Transient, None, || seed) {
            RetryDecision::RetryAfter { delay, .. } => {
                assert!(delay <= Duration::from_millis(400), "seed {seed} gave {delay:?}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn retry_after_wins_only_when_longer_and_is_clamped() {
    let cfg = RetryConfig::default();

    let shorter = decide_retry(
        &cfg,
        1,
        FailureClass::Transient,
        Some(Duration::from_millis(100)),
        no_rand,
    );
    assert!(matches!(
        shorter,
        RetryDecision::RetryAfter {
            reason: RetryReason::Backoff,
            ..
        }
    ));

    let huge = decide_retry(
        &cfg,
        1,
        FailureClass::Transient,
        Some(Duration::from_secs(3600)),
        no_rand,
    );
    assert_eq!(
        huge,
        RetryDecision::RetryAfter {
            delay: Duration::from_secs(10),
            reason: RetryReason::RetryAfterHeader
        }
    );

    let ignoring = RetryConfig {
        respect_retry_after: false,
        ..Default::default()
    };
    assert!(matches!(
        decide_retry(&ignoring, 1, FailureClass::Transient, Some(Duration::from_secs(5)), no_rand),
        RetryDecision::RetryAfter {
            reason: RetryReason::Backoff,
            ..
        }
    ));
}

#[test]
fn default_classifier_treats_wrong_shape_statuses_as_non_retryable() {
    let classifier = RetryClassifier::default();
    assert_eq!(
        classifier.non_retryable_statuses().collect::<Vec<_>>(),
        vec![400, 404, 405]
    );

    for status in [400, 404, 405] {
        assert_eq!(
            classifier.classify(&StrategyError::http(status, "x")),
            FailureClass::NonRetryable { status }
        );
    }
    for status in [401, 403, 409, 429, 500, 502, 503] {
        assert_eq!(
            classifier.classify(&StrategyError::http(status, "x")),
            FailureClass::Transient
        );
    }
    assert_eq!(
        classifier.classify(&StrategyError::Network("refused".into())),
        FailureClass::Transient
    );
    assert_eq!(
        classifier.classify(&StrategyError::Timeout("slow".into())),
        FailureClass::Transient
    );
}

#[test]
fn retry_after_header_accepts_seconds_and_dates() {
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    let secs = BTreeMap::from([("Retry-After".to_string(), " 3 ".to_string())]);
    assert_eq!(parse_retry_after(&secs, now), Some(Duration::from_secs(3)));

    let future = httpdate::fmt_http_date(now + Duration::from_secs(20));
    let date = BTreeMap::from([("retry-after".to_string(), future)]);
    assert_eq!(parse_retry_after(&date, now), Some(Duration::from_secs(20)));

    let past = httpdate::fmt_http_date(now - Duration::from_secs(20));
    let date = BTreeMap::from([("retry-after".to_string(), past)]);
    assert_eq!(parse_retry_after(&date, now), Some(Duration::ZERO));

    let junk = BTreeMap::from([("retry-after".to_string(), "soon".to_string())]);
    assert_eq!(parse_retry_after(&junk, now), None);
    assert_eq!(parse_retry_after(&BTreeMap::new(), now), None);
}

#[test]
fn document_overrides_layer_on_defaults() {
    let spec = RetrySpec {
        max_attempts_per_strategy: Some(3),
        base_delay_ms: Some(50),
        jitter: Some(JitterMode::Full),
        non_retryable_statuses: Some(vec![404, 410]),
        deadline_ms: Some(5_000),
        ..Default::default()
    };

    let cfg = ExecutorConfig::default().with_overrides(&spec);
    assert_eq!(cfg.retry.max_attempts_per_strategy, 3);
    assert_eq!(cfg.retry.base_delay, Duration::from_millis(50));
    assert_eq!(cfg.retry.factor, 2.0);
    assert_eq!(cfg.retry.jitter, Jitter::Full);
    assert_eq!(cfg.classifier, RetryClassifier::new([404, 410]));
    assert_eq!(cfg.deadline, Some(Duration::from_secs(5)));
    assert_eq!(cfg.attempt_timeout, None);
}

#[test]
fn jitter_mode_parses_from_flag_text() {
    assert_eq!("none".parse::<Jitter>(), Ok(Jitter::None));
    assert_eq!("full".parse::<Jitter>(), Ok(Jitter::Full));
    assert!("equal".parse::<Jitter>().is_err());
}

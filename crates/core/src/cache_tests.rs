//! Tests for the per-run response cache

#[cfg(test)]
mod tests {
    use super::super::cache::ResponseCache;
    use super::super::types::FetchKey;
    use chrono::NaiveDate;
    use std::cell::Cell;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_identical_keys_fetch_once() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        for _ in 0..2 {
            let payload = cache
                .get_or_fetch(FetchKey::day("nrk1.nrk.no", date(1)), || async {
                    calls.set(calls.get() + 1);
                    Ok::<_, String>(b"<tv/>".to_vec())
                })
                .await
                .unwrap();
            assert_eq!(payload.as_slice(), b"<tv/>");
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_dates_fetch_separately() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        for day in [1, 2, 1, 2] {
            cache
                .get_or_fetch(FetchKey::day("nrk1.nrk.no", date(day)), || async {
                    calls.set(calls.get() + 1);
                    Ok::<_, String>(day)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.get(), 2);
        assert!(cache.contains(&FetchKey::day("nrk1.nrk.no", date(2))));
    }

    #[tokio::test]
    async fn test_same_date_different_channels_fetch_separately() {
        let mut cache = ResponseCache::new();

        let nrk1 = cache
            .get_or_fetch(FetchKey::day("nrk1.nrk.no", date(1)), || async {
                Ok::<_, String>("nrk1")
            })
            .await
            .unwrap();
        let nrk2 = cache
            .get_or_fetch(FetchKey::day("nrk2.nrk.no", date(1)), || async {
                Ok::<_, String>("nrk2")
            })
            .await
            .unwrap();

        assert_eq!(*nrk1, "nrk1");
        assert_eq!(*nrk2, "nrk2");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_window_key_is_cached() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);
        let key = FetchKey::window("hkqs", date(1), date(4));

        for _ in 0..3 {
            cache
                .get_or_fetch(key.clone(), || async {
                    calls.set(calls.get() + 1);
                    Ok::<_, String>(())
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let mut cache: ResponseCache<Vec<u8>> = ResponseCache::new();
        let key = FetchKey::day("tv2.no", date(1));

        let err = cache
            .get_or_fetch(key.clone(), || async { Err("connection reset".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "connection reset");
        assert!(!cache.contains(&key));
        assert!(cache.is_empty());

        let payload = cache
            .get_or_fetch(key.clone(), || async { Ok::<_, String>(vec![1, 2, 3]) })
            .await
            .unwrap();
        assert_eq!(payload.as_slice(), &[1, 2, 3]);
        assert!(cache.contains(&key));
    }
}

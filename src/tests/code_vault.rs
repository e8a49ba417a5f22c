#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use crate::session::{code_vault::CodeVault, error::SessionError};

    #[test]
    fn reserved_codes_are_unique() {
        let vault = CodeVault::new(6);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let code = vault.reserve().unwrap();
            assert!(seen.insert(code));
        }

        assert_eq!(vault.in_use_count(), 200);
    }

    #[test]
    fn codes_use_the_readable_charset() {
        let vault = CodeVault::new(6);

        for _ in 0..50 {
            let code = vault.reserve().unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| {
                c.is_ascii_uppercase() && c != 'O' && c != 'I'
                    || c.is_ascii_digit() && c != '0' && c != '1'
            }));
        }
    }

    #[test]
    fn release_frees_the_code() {
        let vault = CodeVault::new(6);
        let code = vault.reserve().unwrap();
        assert_eq!(vault.in_use_count(), 1);

        vault.release(&code).unwrap();
        assert_eq!(vault.in_use_count(), 0);
    }

    #[test]
    fn single_char_codes_exhaust() {
        let vault = CodeVault::new(1);

        // 32 charset characters, so the 33rd reservation cannot succeed
        let mut reserved = 0;
        let exhausted = loop {
            match vault.reserve() {
                Ok(_) => reserved += 1,
                Err(e) => break e,
            }
            if reserved > 32 {
                panic!("Reserved more codes than the charset allows");
            }
        };

        assert_eq!(reserved, 32);
        assert!(matches!(exhausted, SessionError::CodesExhausted));
    }

    #[tokio::test]
    async fn concurrent_reservations_stay_unique() {
        let vault = Arc::new(CodeVault::new(6));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let vault = vault.clone();
            handles.push(tokio::spawn(async move { vault.reserve() }));
        }

        let results = futures::future::join_all(handles).await;
        let codes: HashSet<String> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        assert_eq!(codes.len(), 50);
        assert_eq!(vault.in_use_count(), 50);
    }
}

//! Similar-post ranking by shared tags.

use std::cmp::Ordering;
use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{Post, PublishedFilter};
use crate::error::RepoError;
use crate::ports::PostRepository;

/// Number of similar posts shown under an article.
pub const SIMILAR_POSTS_LIMIT: usize = 4;

/// Ranks other published posts by how many tags they share with a target.
///
/// Ordering is `same_tags` descending, then `publish` descending. Posts tied
/// on both keys keep the order in which the candidate supply returned them.
#[derive(Debug, Clone, Copy)]
pub struct SimilarPostsRanker {
    limit: usize,
}

impl Default for SimilarPostsRanker {
    fn default() -> Self {
        Self {
            limit: SIMILAR_POSTS_LIMIT,
        }
    }
}

impl SimilarPostsRanker {
    /// Fetch candidates for `target` from `supply` and rank them.
    ///
    /// A post without tags has no similar posts; the supply is not queried.
    pub async fn rank_similar(
        &self,
        target: &Post,
        supply: &dyn PostRepository,
        filter: &PublishedFilter,
    ) -> Result<Vec<Post>, RepoError> {
        let target_tags = target.tag_ids();
        if target_tags.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<Uuid> = target_tags.into_iter().collect();
        let candidates = supply
            .find_published_sharing_tags(&tag_ids, target.id, filter)
            .await?;

        tracing::debug!(
            post_id = %target.id,
            candidates = candidates.len(),
            "Ranking similar posts"
        );

        Ok(self.rank_candidates(target, candidates, filter))
    }

    /// Rank an already fetched candidate list.
    ///
    /// Candidates that are the target itself, are not visible under `filter`,
    /// or share no tag with the target are dropped.
    pub fn rank_candidates(
        &self,
        target: &Post,
        candidates: Vec<Post>,
        filter: &PublishedFilter,
    ) -> Vec<Post> {
        let target_tags = target.tag_ids();

        let mut scored: Vec<(usize, Post)> = candidates
            .into_iter()
            .filter(|p| p.id != target.id && filter.matches(p))
            .map(|p| (same_tags(&target_tags, &p), p))
            .filter(|(score, _)| *score > 0)
            .collect();

        // sort_by is stable: full ties keep fetch order
        scored.sort_by(|(score_a, a), (score_b, b)| match score_b.cmp(score_a) {
            Ordering::Equal => b.publish.cmp(&a.publish),
            other => other,
        });

        scored
            .into_iter()
            .take(self.limit)
            .map(|(_, post)| post)
            .collect()
    }
}

/// Number of distinct tags `candidate` shares with `target_tags`.
pub fn same_tags(target_tags: &HashSet<Uuid>, candidate: &Post) -> usize {
    candidate
        .tag_ids()
        .iter()
        .filter(|id| target_tags.contains(id))
        .count()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, Utc};

    use super::*;
    use crate::domain::Tag;

    struct Tags {
        python: Tag,
        django: Tag,
        rust: Tag,
    }

    fn tags() -> Tags {
        Tags {
            python: Tag::new("Python".to_string(), "python".to_string()),
            django: Tag::new("Django".to_string(), "django".to_string()),
            rust: Tag::new("Rust".to_string(), "rust".to_string()),
        }
    }

    fn post(slug: &str, publish: DateTime<Utc>, tags: Vec<Tag>) -> Post {
        Post::new(
            slug.to_string(),
            slug.to_string(),
            "admin".to_string(),
            String::new(),
        )
        .published_at(publish)
        .with_tags(tags)
    }

    /// Candidate supply returning a fixed list and recording its queries.
    struct FixedSupply {
        candidates: Vec<Post>,
        queries: Mutex<Vec<(Vec<Uuid>, Uuid)>>,
    }

    impl FixedSupply {
        fn new(candidates: Vec<Post>) -> Self {
            Self {
                candidates,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PostRepository for FixedSupply {
        async fn find_published_by_id(
            &self,
            _id: Uuid,
            _filter: &PublishedFilter,
        ) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn find_published_by_date_and_slug(
            &self,
            _date: NaiveDate,
            _slug: &str,
            _filter: &PublishedFilter,
        ) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn count_published(
            &self,
            _tag_id: Option<Uuid>,
            _filter: &PublishedFilter,
        ) -> Result<u64, RepoError> {
            Ok(0)
        }

        async fn list_published(
            &self,
            _tag_id: Option<Uuid>,
            _filter: &PublishedFilter,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }

        async fn find_published_sharing_tags(
            &self,
            tag_ids: &[Uuid],
            exclude_id: Uuid,
            _filter: &PublishedFilter,
        ) -> Result<Vec<Post>, RepoError> {
            self.queries
                .lock()
                .unwrap()
                .push((tag_ids.to_vec(), exclude_id));
            Ok(self.candidates.clone())
        }
    }

    #[tokio::test]
    async fn test_shared_tag_count_beats_recency() {
        let t = tags();
        let now = Utc::now();
        let filter = PublishedFilter::at(now);

        let x = post("x", now - Duration::days(10), vec![t.python.clone(), t.django.clone()]);
        let y = post("y", now - Duration::days(5), vec![t.python.clone()]);
        let z = post("z", now - Duration::days(1), vec![t.django.clone(), t.python.clone()]);

        let supply = FixedSupply::new(vec![y.clone(), z.clone()]);
        let ranked = SimilarPostsRanker::default()
            .rank_similar(&x, &supply, &filter)
            .await
            .unwrap();

        let slugs: Vec<&str> = ranked.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["z", "y"]);

        let queries = supply.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].1, x.id);
        assert_eq!(queries[0].0.len(), 2);
    }

    #[tokio::test]
    async fn test_untagged_post_has_no_similar_posts() {
        let t = tags();
        let now = Utc::now();
        let target = post("lonely", now, Vec::new());
        let supply = FixedSupply::new(vec![post("other", now, vec![t.rust])]);

        let ranked = SimilarPostsRanker::default()
            .rank_similar(&target, &supply, &PublishedFilter::at(now))
            .await
            .unwrap();

        assert!(ranked.is_empty());
        assert!(supply.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_equal_overlap_orders_by_publish_descending() {
        let t = tags();
        let now = Utc::now();
        let target = post("target", now, vec![t.rust.clone()]);
        let older = post("older", now - Duration::days(3), vec![t.rust.clone()]);
        let newer = post("newer", now - Duration::days(1), vec![t.rust.clone()]);

        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            vec![older, newer],
            &PublishedFilter::at(now),
        );

        let slugs: Vec<&str> = ranked.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
    }

    #[test]
    fn test_full_ties_keep_fetch_order() {
        let t = tags();
        let now = Utc::now();
        let publish = now - Duration::hours(2);
        let target = post("target", now, vec![t.rust.clone()]);
        let first = post("first", publish, vec![t.rust.clone()]);
        let second = post("second", publish, vec![t.rust.clone()]);

        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            vec![first, second],
            &PublishedFilter::at(now),
        );

        assert_eq!(ranked[0].slug, "first");
        assert_eq!(ranked[1].slug, "second");
    }

    #[test]
    fn test_result_is_truncated_to_limit() {
        let t = tags();
        let now = Utc::now();
        let target = post("target", now, vec![t.python.clone()]);
        let candidates: Vec<Post> = (0..7)
            .map(|i| post(&format!("p{i}"), now - Duration::days(i), vec![t.python.clone()]))
            .collect();

        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            candidates,
            &PublishedFilter::at(now),
        );

        assert_eq!(ranked.len(), SIMILAR_POSTS_LIMIT);
        assert_eq!(ranked[0].slug, "p0");
        assert_eq!(ranked[3].slug, "p3");
    }

    #[test]
    fn test_target_and_invisible_posts_are_dropped() {
        let t = tags();
        let now = Utc::now();
        let filter = PublishedFilter::at(now);
        let target = post("target", now - Duration::days(1), vec![t.python.clone()]);

        let mut draft = post("draft", now - Duration::days(1), vec![t.python.clone()]);
        draft.status = crate::domain::PostStatus::Draft;
        let scheduled = post("scheduled", now + Duration::days(1), vec![t.python.clone()]);
        let visible = post("visible", now - Duration::days(2), vec![t.python.clone()]);

        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            vec![target.clone(), draft, scheduled, visible],
            &filter,
        );

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].slug, "visible");
        assert!(ranked.iter().all(|p| filter.matches(p) && p.id != target.id));
    }

    #[test]
    fn test_duplicate_tag_associations_count_once() {
        let t = tags();
        let now = Utc::now();
        let target = post("target", now, vec![t.python.clone(), t.django.clone()]);
        let repeated = post(
            "repeated",
            now - Duration::days(1),
            vec![t.python.clone(), t.python.clone(), t.python.clone()],
        );
        let both = post(
            "both",
            now - Duration::days(9),
            vec![t.python.clone(), t.django.clone()],
        );

        assert_eq!(same_tags(&target.tag_ids(), &repeated), 1);

        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            vec![repeated, both],
            &PublishedFilter::at(now),
        );
        assert_eq!(ranked[0].slug, "both");
    }

    #[test]
    fn test_ordering_holds_for_mixed_candidates() {
        let t = tags();
        let now = Utc::now();
        let target = post(
            "target",
            now,
            vec![t.python.clone(), t.django.clone(), t.rust.clone()],
        );
        let candidates = vec![
            post("a", now - Duration::days(4), vec![t.python.clone()]),
            post("b", now - Duration::days(8), vec![t.python.clone(), t.rust.clone()]),
            post("c", now - Duration::days(2), vec![t.django.clone()]),
            post(
                "d",
                now - Duration::days(30),
                vec![t.python.clone(), t.django.clone(), t.rust.clone()],
            ),
            post("e", now - Duration::days(1), vec![t.rust.clone(), t.django.clone()]),
        ];

        let target_tags = target.tag_ids();
        let ranked = SimilarPostsRanker::default().rank_candidates(
            &target,
            candidates,
            &PublishedFilter::at(now),
        );

        assert!(ranked.len() <= SIMILAR_POSTS_LIMIT);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let (sa, sb) = (same_tags(&target_tags, a), same_tags(&target_tags, b));
            assert!(sa > sb || (sa == sb && a.publish >= b.publish));
        }
        let slugs: Vec<&str> = ranked.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["d", "e", "b", "c"]);
    }
}

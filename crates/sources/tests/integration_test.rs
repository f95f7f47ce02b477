//! Integration tests for the recommendation sources.
//!
//! These load a small catalog through the data-loader and check the
//! behaviour every recommendation must have, for every reader.

use data_loader::{DataIndex, Like, LikedSets, Series, SeriesId, SeriesKind, User};
use sources::{CollaborativeRecommender, MAX_RECOMMENDATIONS, PopularSource, jaccard};
use std::collections::HashSet;
use std::sync::Arc;

fn create_test_index() -> Arc<DataIndex> {
    let readers = ["ana", "ben", "cho", "dev", "eli", "fay", "gus", "new"];
    let users = readers
        .iter()
        .map(|id| User {
            id: id.to_string(),
            display_name: id.to_string(),
        })
        .collect();

    let series = (1..=30)
        .map(|id| Series {
            id,
            title: format!("Series {}", id),
            kind: SeriesKind::Comic,
            thumbnail: Some(format!("covers/{}.png", id)),
        })
        .collect();

    // "new" never liked anything; "gus" shares nothing with the others
    let liked: [(&str, &[SeriesId]); 7] = [
        ("ana", &[1, 2, 3, 4, 5]),
        ("ben", &[1, 2, 3, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]),
        ("cho", &[2, 3, 4, 6, 17, 18, 19, 20, 21, 22, 23]),
        ("dev", &[1, 5, 6, 7, 24]),
        ("eli", &[5, 6, 25, 26, 27]),
        ("fay", &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
        ("gus", &[28, 29, 30]),
    ];
    let likes = liked
        .iter()
        .flat_map(|(user, ids)| {
            ids.iter().map(move |&series_id| Like {
                user_id: user.to_string(),
                series_id,
                timestamp: 1_700_000_000 + i64::from(series_id),
            })
        })
        .collect();

    let index = DataIndex::from_records(users, series, likes);
    index.validate().unwrap();
    Arc::new(index)
}

#[test]
fn test_every_reader_gets_valid_recommendations() {
    let index = create_test_index();
    let recommender = CollaborativeRecommender::new();

    for user_id in index.get_all_user_ids() {
        let own = index.get_user_likes(&user_id).unwrap();
        for limit in [0, 1, 3, 100] {
            let result = recommender.recommend(&user_id, index.liked_sets(), limit);

            assert!(result.len() <= MAX_RECOMMENDATIONS);
            assert!(
                result.iter().all(|id| !own.contains(id)),
                "{} got an already-liked series",
                user_id
            );
            let unique: HashSet<_> = result.iter().collect();
            assert_eq!(unique.len(), result.len());
            if limit == 0 {
                assert!(result.is_empty());
            }
        }
    }
}

#[test]
fn test_isolated_and_new_readers_fall_back_to_popular() {
    let index = create_test_index();
    let recommender = CollaborativeRecommender::new();

    assert!(recommender.recommend("gus", index.liked_sets(), 100).is_empty());
    assert!(recommender.recommend("new", index.liked_sets(), 100).is_empty());
    assert!(recommender.recommend("not-a-reader", index.liked_sets(), 100).is_empty());

    let popular = PopularSource::new(index.clone()).get_top_series(None, 3);
    let ids: Vec<SeriesId> = popular.iter().map(|p| p.series_id).collect();
    // Series 6 has five likes; 1, 2, 3 and 5 tie at four and go by id
    assert_eq!(ids, vec![6, 1, 2]);
}

#[test]
fn test_similarity_is_symmetric_across_readers() {
    let index = create_test_index();
    let sets = index.liked_sets();
    for (a, likes_a) in sets {
        for (b, likes_b) in sets {
            assert_eq!(
                jaccard(likes_a, likes_b),
                jaccard(likes_b, likes_a),
                "{} vs {}",
                a,
                b
            );
        }
        if !likes_a.is_empty() {
            assert_eq!(jaccard(likes_a, likes_a), 1.0);
        }
    }
}

#[test]
fn test_recommendations_ranked_by_neighbor_count() {
    let index = create_test_index();
    let recommender = CollaborativeRecommender::new();

    let scored = recommender.recommend_scored("ana", index.liked_sets(), 100);
    assert!(!scored.is_empty());
    assert!(scored.windows(2).all(|w| w[0].neighbor_count >= w[1].neighbor_count));

    // Series 6 is liked by ben, cho, dev, eli and fay
    assert_eq!(scored[0].series_id, 6);
    assert_eq!(scored[0].neighbor_count, 5);
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let index = create_test_index();
    let rebuilt: LikedSets = index
        .liked_sets()
        .iter()
        .map(|(user, likes)| (user.clone(), likes.clone()))
        .collect();

    let recommender = CollaborativeRecommender::new();
    for user_id in index.get_all_user_ids() {
        assert_eq!(
            recommender.recommend(&user_id, index.liked_sets(), 4),
            recommender.recommend(&user_id, &rebuilt, 4)
        );
    }
}

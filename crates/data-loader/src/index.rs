//! DataIndex building and indexing logic.
//!
//! - Load the three export files into the primary stores
//! - Compute per-series statistics
//! - Validate cross references

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl DataIndex {
    /// Load the catalog export from a directory holding
    /// `users.dat`, `series.dat` and `likes.dat`.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", data_dir);

        let users_path = data_dir.join("users.dat");
        let series_path = data_dir.join("series.dat");
        let likes_path = data_dir.join("likes.dat");

        // Three-way parallel parse
        let ((users, series), likes) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_series(&series_path),
                )
            },
            || parser::parse_likes(&likes_path),
        );

        let users = users?;
        let series = series?;
        let likes = likes?;

        info!(
            "Parsed {} users, {} series, {} likes",
            users.len(),
            series.len(),
            likes.len()
        );

        let index = DataIndex::from_records(users, series, likes);
        index.validate()?;

        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Build an index from already-parsed records and compute statistics.
    ///
    /// Every user gets a (possibly empty) liked set so that readers who
    /// never liked anything are still known to the recommender.
    pub fn from_records(users: Vec<User>, series: Vec<Series>, likes: Vec<Like>) -> Self {
        let mut index = DataIndex::new();

        for user in users {
            index.liked_sets.ensure_user(user.id.clone());
            index.insert_user(user);
        }
        for s in series {
            index.insert_series(s);
        }
        for like in likes {
            index.insert_like(like);
        }

        index.compute_series_stats();
        index
    }

    /// Compute like counts for every series in the catalog
    pub fn compute_series_stats(&mut self) {
        let series_likes = &self.series_likes;
        self.series_stats = self
            .series
            .par_iter()
            .map(|(&series_id, _)| {
                let like_count = series_likes.get(&series_id).map_or(0, Vec::len);
                (series_id, SeriesStats::from_like_count(like_count))
            })
            .collect();
    }

    /// Validate data integrity
    ///
    /// - every user id is non-empty
    /// - every like references a known user and a known series
    pub fn validate(&self) -> Result<()> {
        if self.users.contains_key("") {
            return Err(DataLoadError::ValidationError("user with empty id".to_string()));
        }

        for likes in self.series_likes.values() {
            for like in likes {
                if !self.users.contains_key(&like.user_id) {
                    return Err(DataLoadError::UnknownUser {
                        user_id: like.user_id.clone(),
                        series_id: like.series_id,
                    });
                }
                if !self.series.contains_key(&like.series_id) {
                    return Err(DataLoadError::UnknownSeries {
                        user_id: like.user_id.clone(),
                        series_id: like.series_id,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            display_name: format!("Reader {}", id),
        }
    }

    fn series(id: SeriesId) -> Series {
        Series {
            id,
            title: format!("Series {}", id),
            kind: SeriesKind::Comic,
            thumbnail: None,
        }
    }

    fn like(user_id: &str, series_id: SeriesId) -> Like {
        Like {
            user_id: user_id.to_string(),
            series_id,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_from_records_computes_stats() {
        let index = DataIndex::from_records(
            vec![user("a"), user("b"), user("lurker")],
            vec![series(1), series(2), series(3)],
            vec![like("a", 1), like("b", 1), like("b", 2)],
        );

        assert_eq!(index.get_series_stats(1).unwrap().like_count, 2);
        assert_eq!(index.get_series_stats(2).unwrap().like_count, 1);
        assert_eq!(index.get_series_stats(3).unwrap().like_count, 0);

        // Users without likes still have an (empty) liked set
        assert!(index.liked_sets().contains_user("lurker"));
        assert!(index.get_user_likes("lurker").unwrap().is_empty());
    }

    #[test]
    fn test_validate_missing_series() {
        let index = DataIndex::from_records(vec![user("a")], vec![series(1)], vec![like("a", 9)]);
        let err = index.validate().unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnknownSeries { ref user_id, series_id: 9 } if user_id == "a"
        ));
    }

    #[test]
    fn test_validate_missing_user() {
        let index =
            DataIndex::from_records(vec![user("a")], vec![series(1)], vec![like("ghost", 1)]);
        assert!(matches!(index.validate(), Err(DataLoadError::UnknownUser { .. })));
    }

    #[test]
    fn test_load_from_files() {
        let dir = std::env::temp_dir().join(format!("inkwell-load-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("users.dat"), "a::Ada\nb::Bea\n").unwrap();
        fs::write(
            dir.join("series.dat"),
            "1::Moon Harbor::comic::covers/1.png\n2::Ash Letters::novel::\n",
        )
        .unwrap();
        fs::write(dir.join("likes.dat"), "a::1::10\nb::1::11\nb::2::12\n").unwrap();

        let index = DataIndex::load_from_files(&dir).unwrap();
        assert_eq!(index.counts(), (2, 2, 3));
        assert_eq!(index.get_series_stats(1).unwrap().like_count, 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_missing_dir() {
        let result = DataIndex::load_from_files(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}

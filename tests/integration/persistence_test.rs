// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{indicator_row, open_repository};
use statcrawl::domain::models::task_parameters::TaskMeta;
use statcrawl::domain::repositories::indicator_repository::IndicatorRepository;
use statcrawl::infrastructure::task_source::TaskFileSource;
use statcrawl::utils::url_utils::build_target_url;

#[tokio::test]
async fn test_rows_survive_reopen_and_stay_unique() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (_db, repo) = open_repository(dir.path()).await;
        let inserted = repo
            .save_all(
                vec![indicator_row("GDP", "全国", "12"), indicator_row("GDP", "北京市", "12")],
                &TaskMeta::default(),
            )
            .await
            .unwrap();
        assert_eq!(inserted, 2);
    }

    // 第二次运行重复抓到同样的行
    let (_db, repo) = open_repository(dir.path()).await;
    let inserted = repo
        .save_all(
            vec![indicator_row("GDP", "全国", "12"), indicator_row("GDP", "全国", "13")],
            &TaskMeta::default(),
        )
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(repo.count().await.unwrap(), 3);

    assert_eq!(repo.clear_all().await.unwrap(), 3);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_task_file_drives_urls_and_meta() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.yaml");
    tokio::fs::write(
        &path,
        "- zcode: A0101\n  indicateName: 国内生产总值\n  searchModeOne: 1\n  area: ''\n  beginYear: 2015\n  endYear: latest\n",
    )
    .await
    .unwrap();

    let tasks = TaskFileSource::new(&path).load().await.unwrap();
    assert_eq!(tasks.len(), 1);

    let url = build_target_url("https://data.example.com/trade/valueSearch/index", &tasks[0]).unwrap();
    assert_eq!(
        url.query(),
        Some("zcode=A0101&indicateName=%E5%9B%BD%E5%86%85%E7%94%9F%E4%BA%A7%E6%80%BB%E5%80%BC&searchModeOne=1&beginYear=2015&endYear=latest")
    );

    let meta = TaskMeta::from_parameters(&tasks[0]);
    assert_eq!(meta.zcode.as_deref(), Some("A0101"));
    assert_eq!(meta.search_mode_one, Some(1));
    assert_eq!(meta.area, None);
    assert_eq!(meta.begin_year, Some(2015));
    assert_eq!(meta.end_year, None);

    let (_db, repo) = open_repository(dir.path()).await;
    let inserted = repo
        .save_all(vec![indicator_row("国内生产总值", "全国", "1")], &meta)
        .await
        .unwrap();
    assert_eq!(inserted, 1);
}

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use umc_records_api::types::Role;
use uuid::Uuid;

use common::member_body;

#[tokio::test]
async fn local_user_sees_only_its_church() -> Result<()> {
    let app = common::TestApp::new().await?;
    let mine = app.hierarchy("Mine").await?;
    let theirs = app.hierarchy("Theirs").await?;
    let own_member = app.member(&app.admin, &mine.church, "Own", "male").await?;
    let other_member = app.member(&app.admin, &theirs.church, "Other", "male").await?;
    let local = app.token_for(Role::Local, Some(&mine.church)).await?;

    let list = app.get(&local, "/membership").await?;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["meta"]["total"], 1);
    assert_eq!(list.data()[0]["_id"], own_member.as_str());

    let hidden = app.get(&local, &format!("/membership/{other_member}")).await?;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let visible = app.get(&local, &format!("/membership/{own_member}")).await?;
    assert_eq!(visible.status, StatusCode::OK);

    // ancestors are readable, siblings are not
    let annuals = app.get(&local, "/annual").await?;
    assert_eq!(annuals.body["meta"]["total"], 1);
    assert_eq!(annuals.data()[0]["_id"], mine.annual.as_str());
    let other_annual = app.get(&local, &format!("/annual/{}", theirs.annual)).await?;
    assert_eq!(other_annual.status, StatusCode::FORBIDDEN);
    let own_district = app.get(&local, &format!("/district/{}", mine.district)).await?;
    assert_eq!(own_district.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn local_user_writes_only_inside_its_church() -> Result<()> {
    let app = common::TestApp::new().await?;
    let mine = app.hierarchy("Mine").await?;
    let theirs = app.hierarchy("Theirs").await?;
    let other_member = app.member(&app.admin, &theirs.church, "Other", "male").await?;
    let local = app.token_for(Role::Local, Some(&mine.church)).await?;

    let own = app.post(&local, "/membership", member_body(&mine.church, "New", "female", "1999-09-09")).await?;
    assert_eq!(own.status, StatusCode::CREATED);

    let foreign = app.post(&local, "/membership", member_body(&theirs.church, "Spy", "male", "1999-09-09")).await?;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let edit = app
        .put(&local, &format!("/membership/{other_member}"), member_body(&theirs.church, "Other", "male", "1990-05-20"))
        .await?;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);

    // moving an own record into another church is also a write there
    let moved = app
        .put(&local, &format!("/membership/{}", own.id()), member_body(&theirs.church, "New", "female", "1999-09-09"))
        .await?;
    assert_eq!(moved.status, StatusCode::FORBIDDEN);

    let delete = app.delete(&local, &format!("/membership/{other_member}")).await?;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let church_create = app
        .post(&local, "/localChurch", json!({"name": "Plant", "address": "Cebu", "district": mine.district}))
        .await?;
    assert_eq!(church_create.status, StatusCode::FORBIDDEN);

    let own_church = app
        .put(
            &local,
            &format!("/localChurch/{}", mine.church),
            json!({"name": "Mine Church", "address": "Pasig", "district": mine.district}),
        )
        .await?;
    assert_eq!(own_church.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn missing_record_is_reported_before_scope() -> Result<()> {
    let app = common::TestApp::new().await?;
    let mine = app.hierarchy("Mine").await?;
    let local = app.token_for(Role::Local, Some(&mine.church)).await?;

    let res = app
        .put(&local, &format!("/membership/{}", Uuid::new_v4()), member_body(&mine.church, "Ghost", "male", "1990-01-01"))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn district_user_manages_its_churches() -> Result<()> {
    let app = common::TestApp::new().await?;
    let mine = app.hierarchy("North").await?;
    let theirs = app.hierarchy("South").await?;
    let district = app.token_for(Role::District, Some(&mine.district)).await?;

    let planted = app
        .post(&district, "/localChurch", json!({"name": "Plant", "address": "Baguio", "district": mine.district}))
        .await?;
    assert_eq!(planted.status, StatusCode::CREATED);

    let elsewhere = app
        .post(&district, "/localChurch", json!({"name": "Plant", "address": "Davao", "district": theirs.district}))
        .await?;
    assert_eq!(elsewhere.status, StatusCode::FORBIDDEN);

    let new_district = app
        .post(&district, "/district", json!({"name": "East", "annualConference": mine.annual}))
        .await?;
    assert_eq!(new_district.status, StatusCode::FORBIDDEN);

    let churches = app.get(&district, "/localChurch").await?;
    assert_eq!(churches.body["meta"]["total"], 2);
    Ok(())
}

#[tokio::test]
async fn annual_user_updates_only_its_own_conference() -> Result<()> {
    let app = common::TestApp::new().await?;
    let mine = app.hierarchy("Visayas").await?;
    let theirs = app.hierarchy("Mindanao").await?;
    let annual = app.token_for(Role::Annual, Some(&mine.annual)).await?;

    let own = app
        .put(&annual, &format!("/annual/{}", mine.annual), json!({"name": "Visayas Annual", "episcopalArea": "dea"}))
        .await?;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.data()["episcopalArea"], "dea");

    let other = app
        .put(&annual, &format!("/annual/{}", theirs.annual), json!({"name": "Mindanao Annual", "episcopalArea": "dea"}))
        .await?;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    let district = app
        .post(&annual, "/district", json!({"name": "West", "annualConference": mine.annual}))
        .await?;
    assert_eq!(district.status, StatusCode::CREATED);

    let members = app.get(&annual, "/membership").await?;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body["meta"]["total"], 0);
    Ok(())
}

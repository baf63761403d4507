mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use umc_records_api::types::Collection;
use uuid::Uuid;

async fn ministries_of(app: &common::TestApp, member: &str) -> Result<Vec<String>> {
    let id = Uuid::parse_str(member)?;
    let doc = app
        .state
        .store
        .find_by_id(Collection::Memberships, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("member {member} missing"))?;
    Ok(doc["ministries"]
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default())
}

#[tokio::test]
async fn ministry_roster_is_mirrored_on_members() -> Result<()> {
    let app = common::TestApp::new().await?;
    let tree = app.hierarchy("Choir").await?;
    let alto = app.member(&app.admin, &tree.church, "Alto", "female").await?;
    let bass = app.member(&app.admin, &tree.church, "Bass", "male").await?;

    let created = app
        .post(&app.admin, "/ministry", json!({"name": "Choir", "localChurch": tree.church, "members": [alto, bass, alto]}))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["customId"], "MLC-0001");
    let mut roster: Vec<&str> = created.data()["members"]
        .as_array()
        .map(|ids| ids.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    roster.sort_unstable();
    let mut expected = vec![alto.as_str(), bass.as_str()];
    expected.sort_unstable();
    assert_eq!(roster, expected);
    let ministry = created.id();
    assert_eq!(ministries_of(&app, &alto).await?, vec![ministry.clone()]);
    assert_eq!(ministries_of(&app, &bass).await?, vec![ministry.clone()]);

    let updated = app
        .put(&app.admin, &format!("/ministry/{ministry}"), json!({"name": "Choir", "localChurch": tree.church, "members": [alto]}))
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(ministries_of(&app, &alto).await?, vec![ministry.clone()]);
    assert!(ministries_of(&app, &bass).await?.is_empty());

    // member edits keep the ministry list maintained from the ministry side
    let edit = app
        .put(&app.admin, &format!("/membership/{alto}"), common::member_body(&tree.church, "Alto", "female", "1990-05-20"))
        .await?;
    assert_eq!(edit.status, StatusCode::OK);
    assert_eq!(ministries_of(&app, &alto).await?, vec![ministry.clone()]);

    let show = app.get(&app.admin, &format!("/membership/{alto}")).await?;
    assert_eq!(show.data()["ministries"][0]["name"], "Choir");

    let deleted = app.delete(&app.admin, &format!("/ministry/{ministry}")).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(ministries_of(&app, &alto).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_a_member_leaves_no_dangling_ministry_entry() -> Result<()> {
    let app = common::TestApp::new().await?;
    let tree = app.hierarchy("Ushers").await?;
    let usher = app.member(&app.admin, &tree.church, "Usher", "male").await?;
    let ministry = app
        .create(&app.admin, "/ministry", json!({"name": "Ushers", "localChurch": tree.church, "members": [usher]}))
        .await?;

    app.delete(&app.admin, &format!("/membership/{usher}")).await?;

    let doc = app
        .state
        .store
        .find_by_id(Collection::Ministries, Uuid::parse_str(&ministry)?)
        .await?
        .ok_or_else(|| anyhow::anyhow!("ministry missing"))?;
    assert_eq!(doc["members"], json!([]));
    Ok(())
}

#[tokio::test]
async fn ministry_members_share_its_church() -> Result<()> {
    let app = common::TestApp::new().await?;
    let home = app.hierarchy("Home").await?;
    let away = app.hierarchy("Away").await?;
    let visitor = app.member(&app.admin, &away.church, "Visitor", "male").await?;

    let res = app
        .post(&app.admin, "/ministry", json!({"name": "Youth", "localChurch": home.church, "members": [visitor]}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.message(), "All ministry members must belong to the same local church.");
    assert!(ministries_of(&app, &visitor).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn family_roles_and_church() -> Result<()> {
    let app = common::TestApp::new().await?;
    let home = app.hierarchy("Fam").await?;
    let away = app.hierarchy("Elsewhere").await?;
    let father = app.member(&app.admin, &home.church, "Ramon", "male").await?;
    let mother = app.member(&app.admin, &home.church, "Luz", "female").await?;
    let cousin = app.member(&app.admin, &away.church, "Cousin", "male").await?;

    let empty = app
        .post(&app.admin, "/family", json!({"familyName": "Santos", "localChurch": home.church}))
        .await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let swapped = app
        .post(&app.admin, "/family", json!({"familyName": "Santos", "father": mother, "localChurch": home.church}))
        .await?;
    assert_eq!(swapped.status, StatusCode::BAD_REQUEST);
    assert_eq!(swapped.body["errors"][0]["field"], "father");

    let mixed = app
        .post(
            &app.admin,
            "/family",
            json!({"familyName": "Santos", "father": father, "children": [cousin], "localChurch": home.church}),
        )
        .await?;
    assert_eq!(mixed.status, StatusCode::BAD_REQUEST);
    assert_eq!(mixed.message(), "All family members must belong to the same local church.");

    let family = app
        .post(
            &app.admin,
            "/family",
            json!({"familyName": "Santos", "father": father, "mother": mother, "weddingDate": "2010-06-12", "localChurch": home.church}),
        )
        .await?;
    assert_eq!(family.status, StatusCode::CREATED);
    assert_eq!(family.data()["customId"], "FLC-00001");

    let shown = app.get(&app.admin, &format!("/family/{}", family.id())).await?;
    assert_eq!(shown.data()["father"]["name"]["firstName"], "Ramon");
    assert_eq!(shown.data()["mother"]["name"]["firstName"], "Luz");
    Ok(())
}

#[tokio::test]
async fn null_member_lists_read_as_empty() -> Result<()> {
    let app = common::TestApp::new().await?;
    let tree = app.hierarchy("Nulls").await?;
    let father = app.member(&app.admin, &tree.church, "Pedro", "male").await?;

    let family = app
        .post(
            &app.admin,
            "/family",
            json!({"familyName": "Cruz", "father": father, "children": null, "localChurch": tree.church}),
        )
        .await?;
    assert_eq!(family.status, StatusCode::CREATED);
    assert_eq!(family.data()["children"], json!([]));

    let ministry = app
        .post(&app.admin, "/ministry", json!({"name": "Prayer", "localChurch": tree.church, "members": null}))
        .await?;
    assert_eq!(ministry.status, StatusCode::CREATED);
    assert_eq!(ministry.data()["members"], json!([]));

    let mut body = common::member_body(&tree.church, "Juan", "male", "2001-02-03");
    body["children"] = serde_json::Value::Null;
    let member = app.post(&app.admin, "/membership", body).await?;
    assert_eq!(member.status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn attendance_total_is_derived() -> Result<()> {
    let app = common::TestApp::new().await?;
    let tree = app.hierarchy("Count").await?;

    let body = json!({
        "localChurch": tree.church,
        "date": "2024-03-03",
        "service": "Sunday Worship",
        "men": 12, "women": 20, "youth": 7, "children": 9,
        "total": 1
    });
    let res = app.post(&app.admin, "/attendance", body.clone()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["total"], 48);
    assert_eq!(res.data()["customId"], "ATT-00001");

    let again = app.post(&app.admin, "/attendance", body).await?;
    assert_eq!(again.status, StatusCode::CONFLICT);
    Ok(())
}

//! The card-to-record synchronization pipeline.
//!
//! One pass over a source list. Each card runs through field extraction,
//! attachment classification, asset resolution and record assembly, then
//! hits the publication gate: embargoed cards are assembled but not
//! written, eligible cards are upserted (create on empty id, update
//! otherwise) and the assigned id is written back onto the card. Per-card
//! failures are recorded and never halt the run.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};

use crate::assets::AssetResolver;
use crate::attachments;
use crate::backend::ContentStore;
use crate::board::Board;
use crate::error::SyncError;
use crate::fields::{extract_snack_fields, SnackFields, FIELD_ID};
use crate::model::{Card, FieldDefinition, SnackRecord};
use crate::text::{slugify, split_claim_fact};

/// What a sync run should do with the cards it reads.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub board_id: String,
    pub from_list: String,
    /// List processed cards are moved to, when set
    pub move_to: Option<String>,
    /// Without this flag the run assembles records but never writes
    pub push: bool,
}

/// Terminal state of one card within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    /// Assembled only; the run was not asked to publish
    Assembled,
    /// No qualifying source attachment; never sent
    MissingSource,
    /// Publish date lies in the future; the upsert waits for a later run
    Embargoed,
    /// Publish date could not be parsed; the upsert was skipped
    UnreadableDate,
    /// Upsert succeeded and the id landed back on the card
    Published,
    /// The backend write failed
    PublishFailed,
    /// The backend write succeeded but the id could not be stored on the
    /// card; a later run may publish the card again
    WriteBackFailed,
}

/// One card's result. Per-card failures land here instead of aborting the
/// run.
#[derive(Debug)]
pub struct CardOutcome {
    pub card_id: String,
    pub state: CardState,
    pub record: SnackRecord,
    pub relocated: bool,
}

// Everything a single card needs besides itself; saves threading seven
// arguments through the per-card functions.
struct RunContext<'a> {
    board: &'a dyn Board,
    store: &'a dyn ContentStore,
    assets: &'a AssetResolver<'a>,
    options: &'a SyncOptions,
    id_field: Option<&'a FieldDefinition>,
    now: DateTime<Utc>,
    today: NaiveDate,
}

/// Run the sync over all cards in the source list. Fails only on run-level
/// problems (configuration, listing the cards); everything per-card is
/// collected into the outcomes.
pub async fn run(
    board: &dyn Board,
    store: &dyn ContentStore,
    assets: &AssetResolver<'_>,
    options: &SyncOptions,
    now: DateTime<Utc>,
) -> Result<Vec<CardOutcome>, SyncError> {
    let definitions = board.custom_field_definitions(&options.board_id).await?;
    let cards = board.list_cards(&options.from_list, &definitions).await?;
    info!(
        "Processing {} cards from list {}",
        cards.len(),
        options.from_list
    );

    let id_field = definitions
        .iter()
        .find(|definition| definition.name.eq_ignore_ascii_case(FIELD_ID));
    if id_field.is_none() {
        warn!("Board has no '{FIELD_ID}' custom field; assigned ids cannot be written back");
    }

    let context = RunContext {
        board,
        store,
        assets,
        options,
        id_field,
        now,
        today: now.date_naive(),
    };

    let mut outcomes = Vec::with_capacity(cards.len());
    for card in &cards {
        outcomes.push(process_card(card, &context).await);
    }
    Ok(outcomes)
}

async fn process_card(card: &Card, context: &RunContext<'_>) -> CardOutcome {
    let board = context.board;
    let options = context.options;

    debug!(
        "Found custom fields {} on card {}",
        card.custom_fields.names().collect::<Vec<_>>().join(","),
        card.title
    );
    let fields = extract_snack_fields(&card.custom_fields, context.now);
    let attachments = attachments::classify(&card.attachments);

    let source_url = match attachments::source_url(&attachments, &card.title) {
        Ok(url) => url.to_string(),
        Err(err) => {
            error!("{err}");
            // Leave a trace on the card itself so the editors see it.
            if let Err(comment_err) = board
                .comment(&card.id, "No valid source URL found in attachments.")
                .await
            {
                debug!("Could not comment on card {}: {comment_err}", card.id);
            }
            let record = assemble_record(card, &fields, "", String::new(), String::new());
            return CardOutcome {
                card_id: card.id.clone(),
                state: CardState::MissingSource,
                record,
                relocated: false,
            };
        }
    };

    let slug = slugify(&card.title);
    let image_url = context.assets.editorial_image_url(&fields.image).await;
    let sharepic_url = context
        .assets
        .sharepic_url(attachments::sharepic_url(&attachments), &slug)
        .await;

    let record = assemble_record(card, &fields, &source_url, image_url, sharepic_url);

    if !options.push {
        debug!("Assembled '{}' without pushing", record.headline);
        return CardOutcome {
            card_id: card.id.clone(),
            state: CardState::Assembled,
            record,
            relocated: false,
        };
    }

    match embargo_state(&record.date, context.today) {
        Embargo::Held => {
            info!(
                "'{}' is embargoed until {}, skipping upsert",
                record.headline, record.date
            );
            return CardOutcome {
                card_id: card.id.clone(),
                state: CardState::Embargoed,
                record,
                relocated: false,
            };
        }
        Embargo::Unreadable => {
            error!(
                "Could not parse publish date '{}' on card '{}', skipping upsert",
                record.date, record.headline
            );
            return CardOutcome {
                card_id: card.id.clone(),
                state: CardState::UnreadableDate,
                record,
                relocated: false,
            };
        }
        Embargo::Released => {}
    }

    let (record, state) = publish(card, board, context.store, context.id_field, record).await;
    let mut relocated = false;

    // Relocation follows the upsert, not the write-back: a card whose
    // record landed in the backend leaves the inbox either way.
    if matches!(state, CardState::Published | CardState::WriteBackFailed) {
        if let Some(target) = options.move_to.as_deref() {
            match board.move_card(&card.id, target).await {
                Ok(()) => relocated = true,
                Err(err) => warn!("Could not move card {} to list {target}: {err}", card.id),
            }
        }
    }

    CardOutcome {
        card_id: card.id.clone(),
        state,
        record,
        relocated,
    }
}

/// The single upsert plus write-back. Returns the record (with the
/// assigned id when one was issued) and the resulting state.
async fn publish(
    card: &Card,
    board: &dyn Board,
    store: &dyn ContentStore,
    id_field: Option<&FieldDefinition>,
    mut record: SnackRecord,
) -> (SnackRecord, CardState) {
    let outcome = match store.upsert_record(&record).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Could not publish '{}': {err}", record.headline);
            return (record, CardState::PublishFailed);
        }
    };

    let Some(assigned_id) = outcome.id else {
        error!(
            "Backend response for '{}' contained no usable id",
            record.headline
        );
        return (record, CardState::WriteBackFailed);
    };
    record.id = assigned_id.clone();

    let Some(field) = id_field else {
        return (record, CardState::WriteBackFailed);
    };
    match board.set_custom_field(&card.id, field, &assigned_id).await {
        Ok(()) => {
            debug!(
                "{} '{}' as {assigned_id}",
                if outcome.created { "Created" } else { "Updated" },
                record.headline
            );
            (record, CardState::Published)
        }
        Err(err) => {
            error!("Could not set card ID to {assigned_id}: {err}");
            (record, CardState::WriteBackFailed)
        }
    }
}

/// Combine card fields, classified attachments and resolved assets into
/// the canonical record shape. Pure; no I/O.
pub fn assemble_record(
    card: &Card,
    fields: &SnackFields,
    source_url: &str,
    image_url: String,
    sharepic_url: String,
) -> SnackRecord {
    let (claim, snack) = split_claim_fact(&card.description);
    SnackRecord {
        id: fields.id.clone(),
        slug: slugify(&card.title),
        headline: card.title.clone(),
        claim,
        snack,
        source_url: source_url.to_string(),
        date: fields.date.clone(),
        category: fields.category.clone(),
        medium: fields.medium.clone(),
        tags: fields.tags.clone(),
        image_url,
        sharepic_url,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Embargo {
    /// The publish date has passed (or is today)
    Released,
    /// The publish date lies strictly in the future
    Held,
    /// The date field did not parse
    Unreadable,
}

fn embargo_state(date: &str, today: NaiveDate) -> Embargo {
    match parse_publish_date(date) {
        Some(publish_date) if publish_date > today => Embargo::Held,
        Some(_) => Embargo::Released,
        None => Embargo::Unreadable,
    }
}

// Dates arrive either as plain calendar dates typed by editors or as the
// RFC 3339 timestamp the extraction defaults to.
fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

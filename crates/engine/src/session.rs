use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, enabled, info, warn, Level};

use crate::content::{
    CodeLockSpec, Direction, Inspectable, RoomCatalog, StateOverlay, WallId, Zone, ZoneKind,
};
use crate::feedback::FeedbackSink;
use crate::navigation::{self, HitTarget};
use crate::resolver::{
    close_message, resolve_code_submission, resolve_zone_click, CodeEntry, CodeVerdict,
    PuzzleRegistry,
};
use crate::state::{GameState, Toast, DEFAULT_TOAST_DURATION};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("conditional zone '{zone_id}' in chapter '{chapter}' has no registered puzzle")]
    UnregisteredPuzzle { chapter: String, zone_id: String },
    #[error("puzzle registered for '{zone_id}', which is not a conditional zone in chapter '{chapter}'")]
    PuzzleForUnknownZone { chapter: String, zone_id: String },
}

/// Input that cannot be applied in the current session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown zone '{zone_id}'")]
    UnknownZone { zone_id: String },
    #[error("zone '{zone_id}' is not on the active wall {wall}")]
    ZoneNotOnActiveWall { zone_id: String, wall: WallId },
    #[error("zone '{zone_id}' is not currently clickable")]
    ZoneNotClickable { zone_id: String },
    #[error("unknown prop '{prop_id}' on wall {wall}")]
    UnknownProp { prop_id: String, wall: WallId },
    #[error("prop '{prop_id}' is not linked to a zone")]
    PropNotInteractive { prop_id: String },
    #[error("the code entry surface is open")]
    ModalOpen,
    #[error("no code entry surface is open")]
    NoCodeEntry,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub toast_duration: Duration,
    pub debug_mode: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            toast_duration: DEFAULT_TOAST_DURATION,
            debug_mode: false,
        }
    }
}

/// Routes player input into the resolver and store for one playthrough.
pub struct RoomSession {
    catalog: Arc<RoomCatalog>,
    state: GameState,
    puzzles: PuzzleRegistry,
    code_entry: Option<CodeEntry>,
    feedback: Box<dyn FeedbackSink>,
}

impl RoomSession {
    pub fn new(
        catalog: Arc<RoomCatalog>,
        puzzles: PuzzleRegistry,
        feedback: Box<dyn FeedbackSink>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        for zone in catalog.zones() {
            if matches!(zone.kind, ZoneKind::Conditional { .. }) && !puzzles.contains(&zone.id) {
                return Err(SessionError::UnregisteredPuzzle {
                    chapter: catalog.chapter().to_string(),
                    zone_id: zone.id.clone(),
                });
            }
        }
        for zone_id in puzzles.zone_ids() {
            let is_conditional = catalog
                .zone(zone_id)
                .is_some_and(|zone| matches!(zone.kind, ZoneKind::Conditional { .. }));
            if !is_conditional {
                return Err(SessionError::PuzzleForUnknownZone {
                    chapter: catalog.chapter().to_string(),
                    zone_id: zone_id.to_string(),
                });
            }
        }

        let mut state = GameState::new(
            catalog.declared_flags(),
            Toast::new(options.toast_duration),
        );
        state.set_debug_mode(options.debug_mode);
        info!(
            chapter = %catalog.chapter(),
            flag_count = catalog.declared_flags().len(),
            "session_started"
        );

        Ok(Self {
            catalog,
            state,
            puzzles,
            code_entry: None,
            feedback,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn current_wall(&self) -> WallId {
        self.state.current_wall()
    }

    pub fn visible_zones(&self) -> Vec<&Zone> {
        navigation::visible_zones(self.catalog.wall(self.current_wall()), &self.state)
    }

    pub fn active_overlays(&self) -> Vec<&StateOverlay> {
        navigation::active_overlays(self.catalog.wall(self.current_wall()), &self.state)
    }

    pub fn code_entry(&self) -> Option<&CodeEntry> {
        self.code_entry.as_ref()
    }

    pub fn inspecting(&self) -> Option<&Inspectable> {
        self.state
            .inspecting_item()
            .and_then(|id| self.catalog.inspectable(id))
    }

    pub fn rotate(&mut self, direction: Direction) -> Result<WallId, InputError> {
        self.ensure_no_modal()?;
        self.state.close_inspect();
        let wall = self.state.rotate(direction);
        debug!(wall = %wall, direction = ?direction, "wall_rotated");
        Ok(wall)
    }

    pub fn click_zone(&mut self, zone_id: &str) -> Result<(), InputError> {
        self.ensure_no_modal()?;
        if self.dismiss_inspect() {
            return Ok(());
        }
        let catalog = Arc::clone(&self.catalog);
        let zone = catalog.zone(zone_id).ok_or_else(|| InputError::UnknownZone {
            zone_id: zone_id.to_string(),
        })?;
        self.resolve_on_active_wall(&catalog, zone)
    }

    pub fn click_prop(&mut self, prop_id: &str) -> Result<(), InputError> {
        self.ensure_no_modal()?;
        if self.dismiss_inspect() {
            return Ok(());
        }
        let catalog = Arc::clone(&self.catalog);
        let wall = catalog.wall(self.current_wall());
        let prop = wall.prop(prop_id).ok_or_else(|| InputError::UnknownProp {
            prop_id: prop_id.to_string(),
            wall: wall.id,
        })?;
        let zone = prop
            .zone_id
            .as_deref()
            .and_then(|zone_id| catalog.zone(zone_id))
            .ok_or_else(|| InputError::PropNotInteractive {
                prop_id: prop_id.to_string(),
            })?;
        self.resolve_on_active_wall(&catalog, zone)
    }

    /// Clicks whatever sits under the point. Returns the resolved zone id, if any.
    pub fn click_at(&mut self, x_pct: f32, y_pct: f32) -> Result<Option<String>, InputError> {
        self.ensure_no_modal()?;
        if self.dismiss_inspect() {
            return Ok(None);
        }
        let catalog = Arc::clone(&self.catalog);
        let wall = catalog.wall(self.current_wall());
        let zone = match navigation::hit_test(wall, &self.state, x_pct, y_pct) {
            Some(HitTarget::Zone(zone)) => zone,
            Some(HitTarget::Prop(prop)) => match prop.zone_id.as_deref().and_then(|id| catalog.zone(id)) {
                Some(zone) => zone,
                None => return Ok(None),
            },
            None => return Ok(None),
        };
        self.resolve_on_active_wall(&catalog, zone)?;
        Ok(Some(zone.id.clone()))
    }

    pub fn select_item(&mut self, item: &str) -> Result<Option<&str>, InputError> {
        self.ensure_no_modal()?;
        Ok(self.state.set_active_item(item))
    }

    pub fn press_code_digit(&mut self, digit: char) -> Result<bool, InputError> {
        let entry = self.code_entry.as_mut().ok_or(InputError::NoCodeEntry)?;
        Ok(entry.push_digit(digit))
    }

    pub fn clear_code(&mut self) -> Result<(), InputError> {
        let entry = self.code_entry.as_mut().ok_or(InputError::NoCodeEntry)?;
        entry.clear();
        Ok(())
    }

    /// Submits the digits typed so far.
    pub fn submit_code(&mut self) -> Result<CodeVerdict, InputError> {
        let entered = self
            .code_entry
            .as_ref()
            .map(|entry| entry.entered().to_string())
            .ok_or(InputError::NoCodeEntry)?;
        self.submit_code_str(&entered)
    }

    pub fn submit_code_str(&mut self, code: &str) -> Result<CodeVerdict, InputError> {
        let catalog = Arc::clone(&self.catalog);
        let spec = self.open_code_lock(&catalog)?;
        let submission = resolve_code_submission(spec, code);
        info!(verdict = ?submission.verdict, "code_submitted");

        match submission.verdict {
            CodeVerdict::Incomplete => {}
            CodeVerdict::Rejected => {
                if let Some(entry) = self.code_entry.as_mut() {
                    entry.clear();
                }
            }
            CodeVerdict::Accepted => {
                self.state.apply_effects(&submission.effects);
                self.code_entry = None;
            }
        }
        self.deliver(&submission.messages);
        Ok(submission.verdict)
    }

    pub fn close_code_entry(&mut self) -> Result<(), InputError> {
        let catalog = Arc::clone(&self.catalog);
        let message = close_message(self.open_code_lock(&catalog)?);
        self.code_entry = None;
        info!("code_entry_closed");
        self.deliver(&[message]);
        Ok(())
    }

    pub fn close_inspect(&mut self) {
        self.state.close_inspect();
    }

    pub fn advance_time(&mut self, dt: Duration) {
        self.state.advance_time(dt);
    }

    pub fn toggle_debug_mode(&mut self) -> bool {
        let enabled = self.state.toggle_debug_mode();
        info!(debug_mode = enabled, "debug_mode_toggled");
        enabled
    }

    fn ensure_no_modal(&self) -> Result<(), InputError> {
        if self.code_entry.is_some() {
            Err(InputError::ModalOpen)
        } else {
            Ok(())
        }
    }

    fn dismiss_inspect(&mut self) -> bool {
        if self.state.inspecting_item().is_some() {
            self.state.close_inspect();
            true
        } else {
            false
        }
    }

    fn open_code_lock<'c>(
        &self,
        catalog: &'c RoomCatalog,
    ) -> Result<&'c CodeLockSpec, InputError> {
        let entry = self.code_entry.as_ref().ok_or(InputError::NoCodeEntry)?;
        match catalog.zone(entry.zone_id()).map(|zone| &zone.kind) {
            Some(ZoneKind::CodeLock(spec)) => Ok(spec),
            _ => Err(InputError::NoCodeEntry),
        }
    }

    fn resolve_on_active_wall(&mut self, catalog: &RoomCatalog, zone: &Zone) -> Result<(), InputError> {
        let wall = self.current_wall();
        if catalog.wall_of_zone(&zone.id) != Some(wall) {
            return Err(InputError::ZoneNotOnActiveWall {
                zone_id: zone.id.clone(),
                wall,
            });
        }
        if !navigation::is_clickable(zone, &self.state) {
            return Err(InputError::ZoneNotClickable {
                zone_id: zone.id.clone(),
            });
        }

        let outcome = resolve_zone_click(zone, &self.state, &self.puzzles);
        debug!(
            zone_id = %zone.id,
            zone_type = zone.kind.type_tag(),
            effects = ?outcome.effects,
            "zone_resolved"
        );
        self.state.apply_effects(&outcome.effects);
        self.log_snapshot();
        if let Some(request) = outcome.code_entry {
            info!(zone_id = %request.zone_id, code_length = request.code_length, "code_entry_opened");
            self.code_entry = Some(CodeEntry::open(request));
        }
        self.deliver(&outcome.messages);
        Ok(())
    }

    fn log_snapshot(&self) {
        if !enabled!(Level::DEBUG) {
            return;
        }
        match self.state.snapshot_json() {
            Ok(snapshot) => debug!(snapshot = %snapshot, "state_snapshot"),
            Err(error) => warn!(error = %error, "state_snapshot_failed"),
        }
    }

    fn deliver(&mut self, messages: &[String]) {
        for message in messages {
            self.feedback.notify(message);
            self.state.show_toast(message);
        }
    }
}

/// Four-wall test chapter shared by the session and app tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;
    use std::sync::Arc;

    use super::{RoomSession, SessionOptions};
    use crate::content::{compile_room_catalog, RoomCatalog};
    use crate::feedback::FeedbackRecorder;
    use crate::resolver::{GatedRewardPuzzle, PuzzleRegistry};

    pub(crate) const CHAPTER: &str = r#"<Defs>
        <FlagDef><name>drawerUnlocked</name></FlagDef>
        <FlagDef><name>drawerOpen</name></FlagDef>
        <FlagDef><name>tvFixed</name></FlagDef>
        <FlagDef><name>clockOpen</name></FlagDef>
        <WallDef><index>0</index><name>North</name></WallDef>
        <WallDef><index>1</index><name>East</name>
            <zones>
                <li><id>east-drawer</id><name>Drawer</name><type>codelock</type>
                    <top>52</top><left>30</left><width>40</width><height>12</height>
                    <correctCode>314</correctCode><noun>drawer</noun><contents>TV Knob</contents></li>
                <li><id>east-tv-knob</id><name>TV Knob</name><type>conditionalPickup</type>
                    <top>58</top><left>45</left><width>10</width><height>6</height>
                    <itemName>TV Knob</itemName><requiresState>drawerOpen</requiresState></li>
                <li><id>east-letter</id><name>Letter</name><type>inspect</type>
                    <top>52</top><left>3</left><width>10</width><height>8</height>
                    <inspectItem>letter</inspectItem></li>
            </zones>
            <props>
                <li><id>tv-unit</id><top>10</top><left>75</left><width>10</width><height>10</height>
                    <zoneId>east-letter</zoneId></li>
            </props>
        </WallDef>
        <WallDef><index>2</index><name>South</name></WallDef>
        <WallDef><index>3</index><name>West</name>
            <zones>
                <li><id>west-clock</id><name>Clock</name><type>conditional</type>
                    <top>15</top><left>40</left><width>20</width><height>20</height>
                    <requiredState>tvFixed</requiredState></li>
            </zones>
        </WallDef>
        <InspectDef><id>letter</id><title>Letter</title><lines><li>My dear Nour,</li></lines></InspectDef>
    </Defs>"#;

    pub(crate) fn catalog() -> Arc<RoomCatalog> {
        Arc::new(compile_room_catalog("test", Path::new("test.xml"), CHAPTER).expect("catalog"))
    }

    pub(crate) fn puzzles() -> PuzzleRegistry {
        PuzzleRegistry::new().with(
            "west-clock",
            GatedRewardPuzzle {
                open_flag: "clockOpen".to_string(),
                reward_item: "Photo Half B".to_string(),
                opened_message: "It opens.".to_string(),
                already_open_message: "Already open.".to_string(),
                gated_message: "Stuck.".to_string(),
            },
        )
    }

    pub(crate) fn session() -> (RoomSession, FeedbackRecorder) {
        let recorder = FeedbackRecorder::new();
        let session = RoomSession::new(
            catalog(),
            puzzles(),
            Box::new(recorder.clone()),
            SessionOptions::default(),
        )
        .expect("session");
        (session, recorder)
    }
}

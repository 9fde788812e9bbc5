//! calPal Desktop — egui app state and UI.

use eframe::egui;
use lib::api::BackendClient;
use lib::chat::{ChatMessage, Conversation};
use lib::config;
use lib::session::{Session, SessionStore, Theme};
use std::sync::mpsc;
use std::time::Duration;

const INPUT_HINT: &str = "Type your calendar command...";
const CHAT_MESSAGES_MIN_HEIGHT: f32 = 80.0;

pub struct CalPalApp {
    /// Persisted identity and theme entries.
    store: SessionStore,
    /// Current session; identity decides which screen is shown.
    session: Session,
    /// Transcript and the one-request-in-flight gate.
    conversation: Conversation,
    /// Current input text for the chat box.
    chat_input: String,
    /// When Some, a chat send is in flight; we read the reply here.
    chat_turn_receiver: Option<mpsc::Receiver<Result<String, String>>>,
    /// When Some, the OAuth flow is in flight; we read the identity here.
    login_receiver: Option<mpsc::Receiver<Result<String, String>>>,
    /// Last error from a failed login attempt, shown on the login card.
    login_error: Option<String>,
    /// Backend REST client shared with the worker threads.
    client: BackendClient,
    /// Callback listener address from config.
    callback_bind: String,
    callback_port: u16,
    /// Theme last applied to the egui context.
    applied_theme: Option<Theme>,
    /// Focus the input box on the next frame (after a send or login).
    focus_input: bool,
}

impl CalPalApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (config, _) = config::load_config(None).unwrap_or_else(|e| {
            log::warn!("failed to load config, using defaults: {}", e);
            (config::Config::default(), std::path::PathBuf::new())
        });
        let base_url = config::resolve_backend_url(&config);
        let store = SessionStore::open_default();
        let session = store.load();
        log::info!(
            "desktop started ({})",
            if session.identity.is_some() { "signed in" } else { "signed out" }
        );
        Self {
            client: BackendClient::new(Some(base_url)),
            callback_bind: config.callback.bind.clone(),
            callback_port: config.callback.port,
            store,
            session,
            conversation: Conversation::new(),
            chat_input: String::new(),
            chat_turn_receiver: None,
            login_receiver: None,
            login_error: None,
            applied_theme: None,
            focus_input: false,
        }
    }

    /// Apply the session theme to the egui context when it changed.
    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.session.theme) {
            return;
        }
        ctx.set_visuals(match self.session.theme {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        });
        self.applied_theme = Some(self.session.theme);
    }

    /// Start the OAuth flow in a background thread if none is running.
    fn start_login(&mut self) {
        if self.login_receiver.is_some() {
            return;
        }
        self.login_error = None;
        let client = self.client.clone();
        let bind = self.callback_bind.clone();
        let port = self.callback_port;
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = run_login_flow(client, bind, port);
            let _ = tx.send(result);
        });
        self.login_receiver = Some(rx);
    }

    /// Poll for the OAuth flow result. Call each frame.
    fn poll_login(&mut self) {
        let Some(rx) = &self.login_receiver else { return };
        let Ok(result) = rx.try_recv() else { return };
        self.login_receiver = None;
        match result {
            Ok(email) => {
                if let Err(e) = self.store.persist_identity(&email) {
                    log::warn!("persisting identity failed: {}", e);
                }
                self.session.identity = Some(email);
                self.conversation = Conversation::new();
                self.chat_input.clear();
                self.focus_input = true;
            }
            Err(e) => {
                log::warn!("login failed: {}", e);
                self.login_error = Some(format!("Failed to initiate login: {}", e));
            }
        }
    }

    /// Start a chat send in a background thread if the input is accepted.
    fn start_chat_turn(&mut self) {
        if self.chat_turn_receiver.is_some() {
            return;
        }
        let Some(user_id) = self.session.identity.clone() else { return };
        let Some(outbound) = self.conversation.submit(&self.chat_input) else { return };
        self.chat_input.clear();
        self.focus_input = true;
        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = run_send_message(client, outbound, user_id);
            let _ = tx.send(result);
        });
        self.chat_turn_receiver = Some(rx);
    }

    /// Poll for the in-flight reply and append it to the transcript. Call each frame.
    fn poll_chat_turn(&mut self) {
        let Some(rx) = &self.chat_turn_receiver else { return };
        let Ok(result) = rx.try_recv() else { return };
        self.chat_turn_receiver = None;
        match result {
            Ok(reply) => self.conversation.resolve(reply),
            Err(e) => {
                log::warn!("send failed: {}", e);
                self.conversation.fail();
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.session.theme = self.session.theme.toggled();
        if let Err(e) = self.store.persist_theme(self.session.theme) {
            log::warn!("persisting theme failed: {}", e);
        }
    }

    /// Clear the persisted identity and return to the login screen. The
    /// theme entry survives.
    fn logout(&mut self) {
        if let Err(e) = self.store.clear_identity() {
            log::warn!("clearing identity failed: {}", e);
        }
        self.session.identity = None;
        self.conversation = Conversation::new();
        self.chat_input.clear();
        self.chat_turn_receiver = None;
        self.login_error = None;
    }

    /// Login card: title, tagline, and the sign-in button.
    fn ui_login(&mut self, ui: &mut egui::Ui) {
        let connecting = self.login_receiver.is_some();
        ui.add_space(ui.available_height() * 0.25);
        ui.vertical_centered(|ui| {
            egui::Frame::none()
                .fill(ui.style().visuals.panel_fill)
                .stroke(egui::Stroke::new(
                    1.0,
                    ui.style().visuals.widgets.noninteractive.bg_stroke.color,
                ))
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::same(32.0))
                .show(ui, |ui| {
                    ui.heading("📅 calPal");
                    ui.add_space(8.0);
                    ui.label("Your AI-powered calendar assistant");
                    ui.add_space(24.0);
                    let label = if connecting {
                        "Connecting..."
                    } else {
                        "🔐 Sign in with Google"
                    };
                    if ui.add_enabled(!connecting, egui::Button::new(label)).clicked() {
                        self.start_login();
                    }
                    if let Some(ref err) = self.login_error {
                        ui.add_space(12.0);
                        ui.colored_label(egui::Color32::RED, err);
                    }
                });
        });
    }

    /// One transcript bubble: user messages in the stronger fill, bot
    /// replies in the panel fill.
    fn render_chat_message(ui: &mut egui::Ui, m: &ChatMessage) {
        let frame = egui::Frame::none()
            .fill(if m.is_user {
                ui.style().visuals.extreme_bg_color
            } else {
                ui.style().visuals.panel_fill
            })
            .stroke(egui::Stroke::new(
                1.0,
                ui.style().visuals.widgets.noninteractive.bg_stroke.color,
            ))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));
        frame.show(ui, |ui| {
            if m.is_user {
                ui.label(egui::RichText::new(&m.text).strong());
            } else {
                ui.label(&m.text);
            }
        });
    }

    /// Chat screen: transcript with stick-to-bottom scroll, then the input
    /// row. Input and send stay disabled while a reply is pending.
    fn ui_chat(&mut self, ui: &mut egui::Ui) {
        let pending = self.conversation.pending();
        let row_height = ui.spacing().interact_size.y + 16.0;
        let available = ui.available_height();
        let messages_height = (available - row_height).max(CHAT_MESSAGES_MIN_HEIGHT);

        let messages_rect = ui
            .allocate_exact_size(
                egui::vec2(ui.available_width(), messages_height),
                egui::Sense::hover(),
            )
            .0;
        let mut messages_ui =
            ui.child_ui(messages_rect, egui::Layout::top_down(egui::Align::Min));
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(&mut messages_ui, |ui| {
                // Force scroll content to viewport width so the scrollbar stays on the right.
                let content_width = ui.available_width();
                ui.allocate_exact_size(egui::vec2(content_width, 0.0), egui::Sense::hover());
                for m in self.conversation.messages() {
                    Self::render_chat_message(ui, m);
                    ui.add_space(8.0);
                }
                if pending {
                    ui.add(egui::Spinner::new());
                }
            });

        ui.add_space(8.0);
        let mut send_now = false;
        ui.horizontal(|ui| {
            let input_width = ui.available_width() - 48.0;
            let response = ui.add_enabled(
                !pending,
                egui::TextEdit::singleline(&mut self.chat_input)
                    .desired_width(input_width)
                    .hint_text(INPUT_HINT),
            );
            if self.focus_input {
                response.request_focus();
                self.focus_input = false;
            }
            let enter_pressed = response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.any());
            let can_send = !pending && !self.chat_input.trim().is_empty();
            if ui.add_enabled(can_send, egui::Button::new("➤")).clicked() {
                send_now = true;
            }
            if enter_pressed && can_send {
                send_now = true;
            }
        });
        if send_now {
            self.start_chat_turn();
        }
    }
}

impl eframe::App for CalPalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.poll_login();
        self.poll_chat_turn();
        if self.login_receiver.is_some() || self.chat_turn_receiver.is_some() {
            // Keep polling while a background call is in flight.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if self.session.identity.is_some() {
            egui::TopBottomPanel::top("header").show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(16.0, 10.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.heading("calPal 📅");
                            if let Some(ref email) = self.session.identity {
                                ui.label(egui::RichText::new(email.as_str()).weak());
                            }
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("Logout").clicked() {
                                        self.logout();
                                    }
                                    let theme_icon = match self.session.theme {
                                        Theme::Dark => "☀",
                                        Theme::Light => "🌙",
                                    };
                                    if ui.button(theme_icon).clicked() {
                                        self.toggle_theme();
                                    }
                                },
                            );
                        });
                    });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(16.0, 0.0))
                .show(ui, |ui| {
                    if self.session.identity.is_none() {
                        self.ui_login(ui);
                    } else {
                        ui.add_space(8.0);
                        self.ui_chat(ui);
                    }
                });
        });
    }
}

/// Bind the callback listener, fetch the login URL, open the system browser,
/// and wait for the OAuth redirect. Runs in a thread; use blocking.
fn run_login_flow(client: BackendClient, bind: String, port: u16) -> Result<String, String> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    rt.block_on(async move {
        let listener = lib::auth::CallbackListener::bind(&bind, port)
            .await
            .map_err(|e| e.to_string())?;
        let login = client.get_login_url().await.map_err(|e| e.to_string())?;
        open::that(&login.auth_url).map_err(|e| e.to_string())?;
        listener.wait_for_login().await.map_err(|e| e.to_string())
    })
}

/// Send one chat message and return the backend reply text.
fn run_send_message(
    client: BackendClient,
    message: String,
    user_id: String,
) -> Result<String, String> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    rt.block_on(async move {
        client
            .send_message(&message, &user_id)
            .await
            .map(|reply| reply.message)
            .map_err(|e| e.to_string())
    })
}

// Quiz and poll commands.
//
// `/questions` posts one message per uploaded question, each carrying a
// select menu whose component callback records answers on the quiz board.
// `/responses` reads the board and `/closequestion` retires a question.

use crate::core::commands::{
    Argument, ArgumentKind, CommandError, CommandHandler, ComponentHandler, ComponentLifetime,
    CommandResult, EmbedSpec, Permission, Reply,
};
use crate::core::platform::{OutboundMessage, SelectMenuSpec, SelectOption};
use crate::core::quiz::{component_id, parse_questions, sample_questions_yaml, Question, QuizError};
use crate::discord::bot_data::{BotData, ComponentCtx, Commands, Context};
use async_trait::async_trait;
use std::sync::Arc;

pub fn register(commands: &mut Commands) {
    commands.register(
        "questions",
        "Post quiz questions or polls from a YAML file",
        vec![Argument::optional("config", "YAML-formatted questions").kind(ArgumentKind::Attachment)],
        Arc::new(Questions),
    );
    // Downloads the upload and posts then edits one message per question.
    commands.set_deferred("questions");
    commands.register(
        "responses",
        "Show the answers given to a question",
        vec![Argument::required("question_message_id", "The ID of the question message")],
        Arc::new(Responses),
    );
    commands.register(
        "closequestion",
        "Stop accepting answers to a question",
        vec![Argument::required("question_message_id", "The ID of the question message")],
        Arc::new(CloseQuestion),
    );
}

fn usage() -> String {
    format!(
        "Usage: /questions\nYou will need to upload a YAML file that follows the format below.\n```yaml\n{}```",
        sample_questions_yaml()
    )
}

fn question_embed(index: usize, question: &Question) -> EmbedSpec {
    EmbedSpec::new(format!("Question {}", index + 1), &question.question)
}

fn answer_menu(custom_id: String, question: &Question) -> SelectMenuSpec {
    SelectMenuSpec {
        custom_id,
        placeholder: "Select an answer".to_string(),
        min_values: 1,
        max_values: question.max_selections() as u8,
        options: question
            .answers
            .iter()
            .map(|a| SelectOption {
                label: a.answer.clone(),
                value: a.answer.clone(),
            })
            .collect(),
    }
}

fn question_message_id(ctx: &Context<'_>) -> Result<u64, CommandError> {
    ctx.invocation
        .string("question_message_id")
        .and_then(|id| id.trim().parse().ok())
        .ok_or_else(|| QuizError::UnknownQuestion.into())
}

pub struct Questions;

#[async_trait]
impl CommandHandler<BotData> for Questions {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let Some((url, filename)) = ctx.invocation.attachment("config") else {
            return Err(CommandError::usage(usage()));
        };

        let data = ctx.data;
        let channel_id = ctx.invocation.channel_id;
        let text = data.platform.fetch_attachment_text(url).await?;
        let questions = parse_questions(&text)?;
        tracing::info!(file = filename, count = questions.len(), channel_id, "Posting questions");

        for (index, question) in questions.into_iter().enumerate() {
            // Post a placeholder first: the component id needs the message id.
            let message_id = data
                .platform
                .send_message(channel_id, OutboundMessage::text("Loading question..."))
                .await?;

            let custom_id = component_id(message_id, index);
            let final_message = OutboundMessage {
                content: String::new(),
                embed: Some(question_embed(index, &question)),
                select_menu: Some(answer_menu(custom_id.clone(), &question)),
                reply_to: None,
            };

            data.quiz.post(message_id, channel_id, index, question);
            let handle = ctx.components.register(
                custom_id,
                ComponentLifetime::Persistent,
                Arc::new(QuestionAnswer { message_id }),
            );
            data.quiz.attach_handle(message_id, handle);

            if let Err(err) = data
                .platform
                .edit_message(channel_id, message_id, final_message)
                .await
            {
                ctx.components.unregister_handle(handle);
                let _ = data.quiz.close(message_id);
                return Err(err.into());
            }
        }

        Ok(Reply::text("Questions have been posted!"))
    }
}

/// Select-menu callback of one posted question.
pub struct QuestionAnswer {
    message_id: u64,
}

#[async_trait]
impl ComponentHandler<BotData> for QuestionAnswer {
    async fn handle(&self, ctx: ComponentCtx<'_>) -> CommandResult {
        let respondents = ctx
            .data
            .quiz
            .record_answer(self.message_id, ctx.event.user_id, &ctx.event.values)?;

        ctx.data
            .platform
            .edit_message_content(
                ctx.event.channel_id,
                self.message_id,
                &format!("Responses: {}", respondents),
            )
            .await?;

        Ok(Reply::ephemeral("Answer submitted!"))
    }
}

pub struct Responses;

#[async_trait]
impl CommandHandler<BotData> for Responses {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let message_id = question_message_id(&ctx)?;
        let responses = ctx.data.quiz.responses(message_id)?;
        if responses.is_empty() {
            return Ok(Reply::ephemeral("No responses yet."));
        }

        let lines: Vec<String> = responses
            .iter()
            .map(|r| {
                let mark = match r.correct {
                    Some(true) => " ✅",
                    Some(false) => " ❌",
                    None => "",
                };
                format!("User <@{}> answered: {}{}", r.user_id, r.answers.join(", "), mark)
            })
            .collect();

        Ok(Reply::ephemeral(format!("Responses:\n{}", lines.join("\n"))))
    }
}

pub struct CloseQuestion;

#[async_trait]
impl CommandHandler<BotData> for CloseQuestion {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        ctx.invocation.require_permission(Permission::ManageMessages)?;
        let message_id = question_message_id(&ctx)?;

        let posted = ctx.data.quiz.close(message_id)?;
        if let Some(handle) = posted.handle {
            ctx.components.unregister_handle(handle);
        }
        let respondents = posted.respondents();

        let closed = OutboundMessage {
            content: format!("Closed. Responses: {}", respondents),
            embed: Some(question_embed(posted.index, &posted.question)),
            select_menu: None,
            reply_to: None,
        };
        if let Err(err) = ctx
            .data
            .platform
            .edit_message(posted.channel_id, message_id, closed)
            .await
        {
            tracing::warn!(message_id, "Failed to remove answer menu from closed question: {}", err);
        }

        tracing::info!(message_id, respondents, "Question closed");
        Ok(Reply::text(format!(
            "Question closed with {} respondent(s).",
            respondents
        )))
    }
}

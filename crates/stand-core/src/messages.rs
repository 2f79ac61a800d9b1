//! Texts sent to requesters.

pub const HELLO: &str = "Hi! The stand is free right now. Send me a diagnostic archive and I will deploy it.";
pub const BUSY_STALE: &str = "There is a running container that nobody owns and I could not remove it. Please call an operator.";
pub const ALREADY_HOLDING: &str = "You already hold the stand. Delete your resource before deploying again.";

pub const ADDED_TO_QUEUE: &str = "Added you to the queue at position {position}.";
pub const ALREADY_IN_QUEUE: &str = "You are already in the queue at position {position}.";
pub const LEFT_QUEUE: &str = "Removed you from the queue. Come back any time.";
pub const NOT_IN_QUEUE: &str = "You are not in the queue.";
pub const QUEUE_ADVANCED: &str = "Passed the stand on to the next in line.";
pub const SESSION_RESET: &str = "Session state reset.";

pub const HANDOFF_OFFER: &str = "The stand is free, you can start your deployment. I will wait {minutes} minutes before passing it on.";
pub const HANDOFF_EXPIRED: &str = "You did not start in time, the queue moved on.";

pub const TRY_TO_STOP: &str = "Trying to stop the running container...";
pub const RESOURCE_DELETED: &str = "Container removed, session finished. Come again.";
pub const SOMETHING_WRONG: &str = "Something went wrong. Please call an operator.";

pub const WRONG_EXTENSION: &str = "I only understand {extension} diagnostic archives, sorry.";
pub const TOO_BIG: &str = "The archive is too big, the limit is {limit_mib} MiB.";
pub const CANNOT_DOWNLOAD: &str = "Could not download the archive. Please ask an operator to look.";
pub const DOWNLOADED: &str = "Archive downloaded, inspecting...";
pub const CANNOT_PARSE: &str = "Could not find the application version or the diagnostic data in the archive.";
pub const START_DEPLOY: &str = "Starting deployment of {version}";
pub const IMAGE_FAILED: &str = "Could not build the image. Please ask an operator to look.";
pub const IMAGE_BUILT: &str = "Image built, starting the container.";
pub const CONTAINER_EXISTS: &str = "Found an existing container with the same name, removing it...";
pub const CONTAINER_FAILED: &str = "Could not start the container. Please ask an operator to look.";
pub const CONTAINER_UP: &str = "Container is up. Waiting for the application to come alive before loading the diagnostics.";
pub const CONTAINER_DEAD: &str = "The application failed while starting. Please call an operator.";
pub const APP_ALIVE: &str = "The application is alive! Loading the diagnostics.";
pub const STILL_WAITING: &str = "Still waiting... a little more patience.";
pub const READINESS_TIMEOUT: &str = "The application never came up. Please ask an operator to look.";
pub const TASK_FAILED: &str = "The stand is deployed at {url}, but a task did not finish: {description}";
pub const ALL_DONE: &str = "All done! Have a look at {url}. Do not forget to delete the container, there is only one stand.";
pub const REMINDER: &str = "Maybe it is time to delete the container and free the stand?";

pub const LABEL_JOIN_QUEUE: &str = "Join the queue";
pub const LABEL_LEAVE_QUEUE: &str = "Leave the queue";
pub const LABEL_DELETE: &str = "Delete the container";

/// Replace `{name}` placeholders.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

pub fn busy(holder: &str, resource: &str, since: &str) -> String {
    format!(
        "I am currently helping {holder} with {resource} since {since}. \
         You can join the queue and I will message you when the stand is free."
    )
}

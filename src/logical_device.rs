use std::{ops::Deref, rc::Rc};

use ash::vk::{self, PhysicalDeviceFeatures, Queue};
use tracing::debug;

use crate::{
    api::{DeviceRequest, GraphicsApi, QueueRequest},
    instance::InstanceGuard,
    physical_device::PhysicalDeviceDescriptor,
    queue_families::QueueFamilies,
    NegotiationError, Result,
};

const QUEUE_PRIORITY: f32 = 1.0;

/// One queue at full priority from each distinct family.
pub fn queue_requests(queue_families: &QueueFamilies) -> Vec<QueueRequest> {
    queue_families
        .unique()
        .into_iter()
        .map(|family_index| QueueRequest {
            family_index,
            priorities: vec![QUEUE_PRIORITY],
        })
        .collect()
}

/// RAII for logical device
pub struct LogicalDeviceGuard {
    handle: vk::Device,
    physical_device: vk::PhysicalDevice,
    queue_families: QueueFamilies,
    graphics_queue: Queue,
    present_queue: Queue,
    // need to keep a reference to the instance to ensure we get
    // dropped before it does
    instance: Rc<InstanceGuard>,
}

impl LogicalDeviceGuard {
    /// Creates the device with `device_extensions` enabled as given and no
    /// optional features, then fetches queue 0 of the graphics family. When
    /// presentation uses the same family that queue is shared rather than
    /// fetched twice.
    pub fn try_new(
        instance: &Rc<InstanceGuard>,
        physical_device: &PhysicalDeviceDescriptor,
        queue_families: QueueFamilies,
        device_extensions: &[String],
    ) -> Result<Rc<Self>> {
        let request = DeviceRequest {
            queues: queue_requests(&queue_families),
            extensions: device_extensions.to_vec(),
            features: PhysicalDeviceFeatures::default(),
        };
        debug!("Device extension names: {:?}", request.extensions);

        let api = instance.api();
        let handle = api
            .create_device(***instance, physical_device.handle, &request)
            .map_err(NegotiationError::DeviceCreationFailed)?;

        let (graphics_queue, present_queue) = match retrieve_queues(api, handle, &queue_families)
        {
            Ok(queues) => queues,
            Err(code) => {
                api.destroy_device(handle);
                return Err(NegotiationError::DeviceCreationFailed(code));
            }
        };

        Ok(Rc::new(Self {
            handle,
            physical_device: physical_device.handle,
            queue_families,
            graphics_queue,
            present_queue,
            instance: Rc::clone(instance),
        }))
    }

    pub fn api(&self) -> &dyn GraphicsApi {
        self.instance.api()
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn queue_families(&self) -> &QueueFamilies {
        &self.queue_families
    }

    pub fn graphics_queue(&self) -> Queue {
        self.graphics_queue
    }

    pub fn present_queue(&self) -> Queue {
        self.present_queue
    }
}

fn retrieve_queues(
    api: &dyn GraphicsApi,
    device: vk::Device,
    queue_families: &QueueFamilies,
) -> ash::prelude::VkResult<(Queue, Queue)> {
    let graphics_queue = api.device_queue(device, queue_families.graphics, 0)?;
    let present_queue = if queue_families.is_shared() {
        graphics_queue
    } else {
        api.device_queue(device, queue_families.present, 0)?
    };
    Ok((graphics_queue, present_queue))
}

impl Deref for LogicalDeviceGuard {
    type Target = vk::Device;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Drop for LogicalDeviceGuard {
    fn drop(&mut self) {
        debug!("Dropping LogicalDeviceGuard");
        self.instance.api().destroy_device(self.handle);
    }
}
